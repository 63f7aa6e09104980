use serde::{Deserialize, Serialize};

/// Hero section of the storefront homepage, from `GET /api/settings/home`.
///
/// Fields the backend leaves out keep the storefront defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HomeSettings {
    pub hero_video_url: String,
    pub hero_heading: String,
    pub hero_subtitle: String,
    pub hero_overlay_opacity: u8,
    pub hero_height: u8,
    pub hero_heading_size: String,
    pub show_hero_badge: bool,
}

impl Default for HomeSettings {
    fn default() -> Self {
        Self {
            hero_video_url:
                "https://res.cloudinary.com/demo/video/upload/v1689264426/running_shoes_promo.mp4"
                    .to_string(),
            hero_heading: "STEP INTO THE FUTURE".to_string(),
            hero_subtitle: "Discover the latest drops from Nike, Adidas, Jordan, and more."
                .to_string(),
            hero_overlay_opacity: 50,
            hero_height: 85,
            hero_heading_size: "large".to_string(),
            show_hero_badge: true,
        }
    }
}

impl HomeSettings {
    pub fn hero_is_video(&self) -> bool {
        let url = &self.hero_video_url;
        !url.is_empty() && (url.contains("/video/") || url.ends_with(".mp4") || url.ends_with(".webm"))
    }

    /// Tall heroes have room for the flash-sale banner.
    pub fn shows_sale_banner(&self) -> bool {
        self.hero_height > 60
    }
}
