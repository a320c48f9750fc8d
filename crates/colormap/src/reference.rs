//! Reference (default) fill colors per region.

use std::collections::HashMap;

use depomap_core::resolve::fold_diacritics;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Fill used for regions without any color.
pub const NEUTRAL_FILL: Rgb = Rgb::new(0xe5, 0xe7, 0xeb);

/// Color seeded for provinces missing from the reference table.
pub const FALLBACK_FILL: Rgb = Rgb::new(0xd1, 0xd5, 0xdb);

const ORANGE: Rgb = Rgb::new(0xf5, 0x9e, 0x0b);
const LIGHT_ORANGE: Rgb = Rgb::new(0xfb, 0xbf, 0x24);
const LIGHT_GREEN: Rgb = Rgb::new(0x86, 0xef, 0xac);
const LIGHT_BLUE: Rgb = Rgb::new(0x93, 0xc5, 0xfd);
const DARK_BLUE: Rgb = Rgb::new(0x1e, 0x40, 0xaf);
const YELLOW: Rgb = Rgb::new(0xfd, 0xe0, 0x47);
const PEACH: Rgb = Rgb::new(0xfd, 0xba, 0x74);
const PURPLE: Rgb = Rgb::new(0xc0, 0x84, 0xfc);
const ROSE: Rgb = Rgb::new(0xfd, 0xa4, 0xaf);
const GREEN_SE: Rgb = Rgb::new(0x22, 0xc5, 0x5e);
const SALMON: Rgb = Rgb::new(0xd7, 0x97, 0x75);
const GREY: Rgb = FALLBACK_FILL;

const GROUPS: &[(Rgb, &[&str])] = &[
    (ORANGE, &["kirklareli", "edirne", "tekirdag", "istanbul", "kocaeli", "sakarya"]),
    (LIGHT_GREEN, &["canakkale", "balikesir", "bursa", "yalova"]),
    (LIGHT_BLUE, &["izmir", "manisa", "usak"]),
    (DARK_BLUE, &["aydin", "denizli", "mugla"]),
    (
        GREY,
        &[
            "bilecik", "kutahya", "eskisehir", "bolu", "duzce", "afyonkarahisar", "kayseri",
            "nevsehir", "nigde", "yozgat", "sivas", "kirsehir", "aksaray", "zonguldak", "karabuk",
            "bartin",
        ],
    ),
    (LIGHT_ORANGE, &["mersin", "adana", "osmaniye", "hatay"]),
    (
        YELLOW,
        &[
            "ankara", "kirikkale", "cankiri", "kastamonu", "erzurum", "erzincan", "kars", "ardahan",
            "igdir", "agri",
        ],
    ),
    (PEACH, &["sinop", "samsun", "corum", "amasya", "tokat", "ordu"]),
    (
        PURPLE,
        &[
            "giresun", "trabzon", "gumushane", "bayburt", "rize", "artvin", "mardin", "batman",
            "siirt", "sirnak", "diyarbakir", "malatya", "tunceli", "elazig", "bingol", "mus",
        ],
    ),
    (ROSE, &["bitlis", "van", "hakkari", "konya", "karaman"]),
    (GREEN_SE, &["kahramanmaras", "adiyaman", "gaziantep", "sanliurfa", "kilis"]),
    (SALMON, &["burdur", "isparta", "antalya"]),
];

/// Region id → default fill color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceColors {
    colors: HashMap<String, Rgb>,
}

impl ReferenceColors {
    pub fn new(colors: HashMap<String, Rgb>) -> Self {
        Self { colors }
    }

    /// Color for a region id or name; diacritics and case are ignored.
    pub fn get(&self, key: &str) -> Option<Rgb> {
        self.colors
            .get(key)
            .or_else(|| self.colors.get(&fold_diacritics(key)))
            .copied()
    }

    /// Like [`ReferenceColors::get`] with [`FALLBACK_FILL`] for unknown keys.
    pub fn get_or_fallback(&self, key: &str) -> Rgb {
        self.get(key).unwrap_or(FALLBACK_FILL)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Rgb)> {
        self.colors.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for ReferenceColors {
    fn default() -> Self {
        let colors = GROUPS
            .iter()
            .flat_map(|(color, ids)| ids.iter().map(move |id| (id.to_string(), *color)))
            .collect();
        Self { colors }
    }
}
