pub mod city;
pub mod guidance_entry;
pub mod impact;
mod shibuya;
