use image::Rgb;

/// Leaf green used for boxes and label bars.
pub const BOX_COLOR: Rgb<u8> = Rgb([78, 160, 28]);

/// Light agriculture theme for the HTML report.
pub const CSS: &str = r#"
:root{
  --agri-primary:#79C16D;
  --agri-primary-dark:#4FA25A;
  --agri-accent:#CFEAC0;
  --agri-bg:#FAFEF6;
  --agri-card:#FFFFFF;
  --agri-text:#0F2A1C;
  --agri-muted:#6F8B7A;
  --agri-pill:#EEF7E9;
  --agri-border:#E5EFE3;
}
html, body{ background: var(--agri-bg); color: var(--agri-text);
  font-family: system-ui, -apple-system, "Segoe UI", sans-serif; margin:0; }
main{ max-width: 1100px; margin: 0 auto; padding: 16px; }
.brand{ display:flex; align-items:center; gap:16px; }
.brand img{ max-height:64px; }
.brand .name{ font-weight:800; font-size:1.6rem; line-height:1.2; }
.hero{
  background:
    radial-gradient(700px 280px at 10% -20%, rgba(121,193,109,.18), transparent),
    linear-gradient(135deg, #FFFFFF 0%, #F7FBF2 100%);
  border:1px solid var(--agri-border);
  border-radius:24px; padding:22px 20px; margin: 6px 0 12px 0;
}
.hero h1{ margin:0 0 6px 0; font-weight:900; letter-spacing:.2px; font-size:1.8rem; }
.hero p{ margin:0 0 10px 0; color: var(--agri-muted); }
.pill{ display:inline-block; background: var(--agri-pill); padding: 2px 10px 4px 10px;
       border-radius: 999px; color: var(--agri-primary-dark); border:1px solid var(--agri-border); }
.section{ margin: 10px 0 18px 0; padding:16px; background: var(--agri-card);
          border:1px solid var(--agri-border); border-radius: 18px; }
.notice{ padding:10px 14px; border-radius:12px; background: var(--agri-pill); }
.caption{ color: var(--agri-muted); font-size:.9rem; }
.result img{ max-width:100%; height:auto; border-radius:12px; }
table.debug{ border-collapse: collapse; font-size:.9rem; margin: 8px 0; }
table.debug th, table.debug td{ border:1px solid var(--agri-border); padding:4px 8px; text-align:left; }
.eco-card{ background:#FFFFFF; border:1px solid var(--agri-border); border-radius:22px;
           padding:18px 16px; margin:10px 0 18px 0; box-shadow: 0 3px 16px rgba(0,0,0,.04); }
.eco-head{ display:flex; align-items:center; gap:10px; margin-bottom:6px; }
.eco-emoji{ font-size:1.5rem; }
.eco-title{ font-weight:900; font-size:1.28rem; }
.eco-badge{ margin-left:auto; background: var(--agri-pill); color: var(--agri-primary-dark);
            border:1px solid var(--agri-border); border-radius:999px; padding:4px 10px; font-size:.85rem; }
.eco-icons img{ width:48px; height:auto; margin-right:6px; }
.eco-body{ display:flex; gap:16px; align-items:center; }
.eco-images{ flex:1; }
.eco-images img{ max-width:100%; height:auto; margin-bottom:6px; }
.eco-images.grid img{ width:160px; }
.eco-text{ flex:2; }
.eco-meta{ margin: 6px 0 8px 0; color: var(--agri-muted); font-size:.95rem; }
.eco-section-title{ font-weight:800; margin-top:8px; margin-bottom:4px; }
.eco-list{ margin:0 0 4px 0; padding-left:18px;}
.eco-list li{ margin: 2px 0; }
.chip-row{ display:flex; flex-wrap:wrap; gap:8px; margin: 6px 0 2px 0; }
.chip{ background: var(--agri-pill); color: var(--agri-primary-dark); border:1px solid var(--agri-border);
       border-radius:999px; padding:4px 10px; font-size:.88rem; }
.eco-links{ display:flex; gap:10px; margin-top:10px; flex-wrap:wrap; }
.eco-link{ border-radius:999px; padding:8px 12px; border:1px solid var(--agri-border);
           background:#fff; text-decoration:none; color: var(--agri-primary-dark); font-weight:700; }
.eco-link:hover{ background: var(--agri-pill); }
.howto li{ margin:2px 0; }
.citybar{ display:flex; align-items:center; gap:10px; }
.citybadge{ display:inline-block; background: var(--agri-pill); padding:4px 10px;
            border-radius:999px; border:1px solid var(--agri-border); color: var(--agri-primary-dark); }
.sdg-row{ display:flex; gap:12px; flex-wrap:wrap; align-items:center; }
.sdg-card{ display:flex; gap:10px; align-items:center; border:1px solid var(--agri-border);
           background:#fff; padding:10px 12px; border-radius:14px; text-decoration:none; color: var(--agri-text); }
.sdg-card .num{ font-weight:900; font-size:1.4rem; color: var(--agri-primary-dark); }
.sdg-card .txt{ font-weight:700; }
.link-chips{ display:flex; flex-wrap:wrap; gap:10px; margin-top:8px; }
.link-chip{ border:1px solid var(--agri-border); padding:8px 12px; border-radius:999px;
            text-decoration:none; color: var(--agri-primary-dark); background:#fff; font-weight:700; }
.link-chip:hover{ background: var(--agri-pill); }
"#;
