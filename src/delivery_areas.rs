use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryDay {
    Monday,
    Tuesday,
    Thursday,
    Friday,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryRoute {
    pub day: DeliveryDay,
    pub areas: &'static [&'static str],
}

// Some areas are served on more than one day; lookups take the earliest.
pub const DELIVERY_ROUTES: [DeliveryRoute; 4] = [
    DeliveryRoute {
        day: DeliveryDay::Monday,
        areas: &[
            "牛島", "楢山", "大住", "仁井田", "四ツ小屋", "御野場", "御所野",
        ],
    },
    DeliveryRoute {
        day: DeliveryDay::Tuesday,
        areas: &[
            "泉", "外旭川", "将軍野", "土崎", "飯島", "下新城", "金足", "天王", "大久保",
        ],
    },
    DeliveryRoute {
        day: DeliveryDay::Thursday,
        areas: &[
            "中通", "大町", "千秋", "旭南", "旭北", "山王", "高陽幸町", "保戸野", "八橋", "寺内",
            "新屋",
        ],
    },
    DeliveryRoute {
        day: DeliveryDay::Friday,
        areas: &[
            "広面", "桜", "桜が丘", "横森", "上北手", "下北手", "山手台", "大平台", "東通", "南通",
            "楢山", "手形", "旭川", "濁川", "新藤田",
        ],
    },
];

/// Subscription course a member can sign up for.
#[derive(Debug, Clone, Serialize)]
pub struct Course {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const COURSES: [Course; 4] = [
    Course {
        id: "vegiraku",
        name: "ベジ楽コース",
        description: "新鮮野菜の定期便",
    },
    Course {
        id: "komeraku",
        name: "コメ楽コース",
        description: "美味しいお米の定期便",
    },
    Course {
        id: "tamagoraku",
        name: "タマゴ楽コース",
        description: "新鮮たまごの定期便",
    },
    Course {
        id: "ajiraku",
        name: "アジ楽コース",
        description: "新鮮な魚の定期便",
    },
];

pub fn is_known_course(id: &str) -> bool {
    COURSES.iter().any(|course| course.id == id)
}

pub fn delivery_day_for_area(area: &str) -> Option<DeliveryDay> {
    DELIVERY_ROUTES
        .iter()
        .find(|route| route.areas.contains(&area))
        .map(|route| route.day)
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test_case("牛島", Some(DeliveryDay::Monday))]
    #[test_case("土崎", Some(DeliveryDay::Tuesday))]
    #[test_case("新屋", Some(DeliveryDay::Thursday))]
    #[test_case("新藤田", Some(DeliveryDay::Friday))]
    #[test_case("楢山", Some(DeliveryDay::Monday); "area served twice resolves to the first day")]
    #[test_case("東京", None)]
    #[test_case("", None)]
    fn test_delivery_day_for_area(area: &str, expected: Option<DeliveryDay>) {
        assert_eq!(delivery_day_for_area(area), expected);
    }

    #[test_case("vegiraku", true)]
    #[test_case("komeraku", true)]
    #[test_case("tamagoraku", true)]
    #[test_case("ajiraku", true)]
    #[test_case("Vegiraku", false)]
    #[test_case("niku", false)]
    #[test_case("", false)]
    fn test_is_known_course(id: &str, known: bool) {
        assert_eq!(is_known_course(id), known);
    }

    #[test]
    fn test_routes_serialize_in_weekday_order() {
        let json = serde_json::to_value(DELIVERY_ROUTES).unwrap();
        let days: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|route| route["day"].as_str().unwrap())
            .collect();
        assert_eq!(days, ["MONDAY", "TUESDAY", "THURSDAY", "FRIDAY"]);
    }
}
