use super::guidance_entry::{Fact, GuidanceEntry};
use crate::shared::constants::{BOTTLE, CAN, CAP};

pub const GUIDE_URL: &str =
    "https://www.city.shibuya.tokyo.jp/contents/living-in-shibuya/en/daily/garbage.html";
const POSTER_EN: &str = "https://files.city.shibuya.tokyo.jp/assets/12995aba8b194961be709ba879857f70/bfda2f5d763343b5a0b454087299d57f/2024wakedashiEnglish.pdf#page=2";
const PLASTICS_NOTICE: &str = "https://files.city.shibuya.tokyo.jp/assets/12995aba8b194961be709ba879857f70/0cdf099fdfe8456fbac12bb5ad7927e4/assets_kusei_ShibuyaCityNews2206_e.pdf#page=1";

// Fukuoka City photos illustrate the same PET steps.
const PET_STEPS: &[&str] = &[
    "https://kateigomi-bunbetsu.city.fukuoka.lg.jp/files/Rules/images/bottles/ph04.png",
    "https://kateigomi-bunbetsu.city.fukuoka.lg.jp/files/Rules/images/bottles/ph05.png",
    "https://kateigomi-bunbetsu.city.fukuoka.lg.jp/files/Rules/images/bottles/ph06.png",
    "https://kateigomi-bunbetsu.city.fukuoka.lg.jp/files/Rules/images/bottles/ph07.png",
];

const ICON_PET: &str =
    "https://upload.wikimedia.org/wikipedia/commons/thumb/8/87/Recycling_pet.svg/120px-Recycling_pet.svg.png";
const ICON_AL: &str =
    "https://upload.wikimedia.org/wikipedia/commons/thumb/1/1a/Recycling_alumi.svg/120px-Recycling_alumi.svg.png";
const ICON_STEEL: &str =
    "https://upload.wikimedia.org/wikipedia/commons/thumb/4/45/Recycling_steel.svg/120px-Recycling_steel.svg.png";
const ICON_PLA: &str =
    "https://upload.wikimedia.org/wikipedia/commons/thumb/8/8b/Recycling_pla.svg/120px-Recycling_pla.svg.png";

const HANWA_CAN2CAN: &str = "https://www.hanwa.co.jp/images/csr/business/img_5_01.png";
const JAPAN_FORWARD: &str = "https://japan-forward.com/japans-plastic-recycling-the-unseen-reality/";

const PET_BOTTLE: GuidanceEntry = GuidanceEntry {
    title: "Shibuya disposal: PET bottle (resource)",
    emoji: "🧴",
    materials: "Bottle body is PET (polyethylene terephthalate). Caps and labels are PP/PE.",
    why_separate: &[
        "Caps and labels (PP/PE) contaminate the PET stream if left on.",
        "Shibuya asks you to remove caps and labels and sort them with Plastics.",
    ],
    steps: &[
        "Remove the cap and label.",
        "Rinse the bottle.",
        "Crush it flat.",
        "Put PET bottles in a transparent bag for PET.",
        "Put caps and labels with Plastics.",
    ],
    recycles_to: &["New PET bottles", "Fibers for clothing and bags", "Sheets/films"],
    facts: &[
        Fact {
            text: "Japan’s reported plastic 'recycling' rate includes thermal recovery; clean PET enables high-value bottle-to-bottle.",
            url: JAPAN_FORWARD,
        },
        Fact {
            text: "Recycled PET in Japan becomes new bottles, sheets and fibers for clothing/bags.",
            url: "https://www.petbottle-rec.gr.jp/english/actual.html",
        },
    ],
    images: PET_STEPS,
    icons: &[ICON_PET],
    link: GUIDE_URL,
    poster: Some(POSTER_EN),
};

const DRINK_CAN: GuidanceEntry = GuidanceEntry {
    title: "Shibuya disposal: Aluminum or steel can (resource)",
    emoji: "🥫",
    materials: "Mostly aluminum; some cans are steel.",
    why_separate: &[
        "Clean metal cans keep a high-value recycling stream.",
        "Aluminum recycling saves major energy vs producing new metal.",
    ],
    steps: &[
        "Rinse the can.",
        "Optional: Lightly crush/squeeze to save space (only if your building/bin instructions allow).",
        "Put cans in a transparent bag for cans.",
    ],
    recycles_to: &[
        "New beverage cans (can-to-can)",
        "Automotive & construction parts (aluminum)",
        "Remelt scrap ingots",
    ],
    facts: &[
        Fact {
            text: "Coca-Cola Bottlers Japan promotes CAN-to-CAN, including products using recycled aluminum bodies.",
            url: "https://en.ccbji.co.jp/news/detail.php?id=1347",
        },
        Fact {
            text: "Hanwa: used aluminum cans are cleaned, melted and supplied as remelt scrap ingots to aluminum mills — then used again as cans.",
            url: HANWA_CAN2CAN,
        },
    ],
    images: &[HANWA_CAN2CAN],
    icons: &[ICON_AL, ICON_STEEL],
    link: GUIDE_URL,
    poster: Some(POSTER_EN),
};

const BOTTLE_CAP: GuidanceEntry = GuidanceEntry {
    title: "Shibuya disposal: Plastic bottle cap (plastic item)",
    emoji: "🔘",
    materials: "PP or PE (polypropylene or polyethylene) closures.",
    why_separate: &[
        "Caps are not PET. Separating avoids contaminating bottle-to-bottle recycling.",
        "In Shibuya, caps & labels go with Plastic items (プラ), not with PET bottles.",
    ],
    steps: &[
        "Remove from the bottle.",
        "Rinse if sticky.",
        "Put caps with Plastic items in a clear/semi-clear bag.",
    ],
    recycles_to: &["New caps (pilots)", "Plastic containers/packaging", "Pallets & molded goods"],
    facts: &[Fact {
        text: "Separating PP/PE caps and labels keeps the PET stream clean for high-value recycling.",
        url: JAPAN_FORWARD,
    }],
    images: &[],
    icons: &[ICON_PLA],
    link: GUIDE_URL,
    poster: Some(PLASTICS_NOTICE),
};

/// Shibuya entries keyed by detector class name.
pub(super) fn entries() -> Vec<(&'static str, GuidanceEntry)> {
    vec![(BOTTLE, PET_BOTTLE), (CAN, DRINK_CAN), (CAP, BOTTLE_CAP)]
}
