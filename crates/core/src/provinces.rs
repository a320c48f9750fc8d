//! The 81 provinces of Turkey, by display name.

use crate::resolve::fold_diacritics;

/// Province display names in alphabetical (Turkish) order.
pub const PROVINCES: [&str; 81] = [
    "Adana", "Adıyaman", "Afyonkarahisar", "Ağrı", "Aksaray", "Amasya", "Ankara", "Antalya",
    "Ardahan", "Artvin", "Aydın", "Balıkesir", "Bartın", "Batman", "Bayburt", "Bilecik",
    "Bingöl", "Bitlis", "Bolu", "Burdur", "Bursa", "Çanakkale", "Çankırı", "Çorum", "Denizli",
    "Diyarbakır", "Düzce", "Edirne", "Elazığ", "Erzincan", "Erzurum", "Eskişehir", "Gaziantep",
    "Giresun", "Gümüşhane", "Hakkari", "Hatay", "Iğdır", "Isparta", "İstanbul", "İzmir",
    "Kahramanmaraş", "Karabük", "Karaman", "Kars", "Kastamonu", "Kayseri", "Kırıkkale",
    "Kırklareli", "Kırşehir", "Kilis", "Kocaeli", "Konya", "Kütahya", "Malatya", "Manisa",
    "Mardin", "Mersin", "Muğla", "Muş", "Nevşehir", "Niğde", "Ordu", "Osmaniye", "Rize",
    "Sakarya", "Samsun", "Şanlıurfa", "Siirt", "Sinop", "Sivas", "Şırnak", "Tekirdağ", "Tokat",
    "Trabzon", "Tunceli", "Uşak", "Van", "Yalova", "Yozgat", "Zonguldak",
];

/// `(id, display_name)` for every province, where `id` is the ASCII-folded
/// name used as the base-map group id.
pub fn provinces() -> impl Iterator<Item = (String, &'static str)> {
    PROVINCES.iter().map(|&name| (fold_diacritics(name), name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique_ascii() {
        let ids: HashSet<String> = provinces().map(|(id, _)| id).collect();
        assert_eq!(ids.len(), 81);
        assert!(ids.iter().all(|id| id.is_ascii()));
        assert!(ids.contains("sanliurfa"));
        assert!(ids.contains("istanbul"));
        assert!(ids.contains("kirsehir"));
    }
}
