use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::templates::Category;

/// Outcome of file name classification: the winning category plus the
/// placeholder values that category's templates expect.
#[derive(Debug, Clone)]
pub struct Classification {
    pub category: Category,
    pub placeholders: BTreeMap<String, String>,
}

/// Ordered keyword rules. The first matching rule wins, so the more specific
/// intents sit ahead of the broader ones (`new-product-sale` is a product
/// announcement, not a promotion).
fn rules() -> &'static [(Regex, Category)] {
    static RULES: OnceLock<Vec<(Regex, Category)>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (
                r"product|launch|drop|release|feature|unveil",
                Category::Product,
            ),
            (
                r"sale|promo|discount|offer|deal|flash|percent",
                Category::Promotion,
            ),
            (
                r"season|holiday|christmas|summer|winter|spring|autumn|fall|new year|newyear|month",
                Category::Seasonal,
            ),
            (
                r"milestone|anniversary|\d+k\b|followers|users|subscribers",
                Category::Milestone,
            ),
            (
                r"tip|how to|howto|guide|tutorial|learn|lesson|myth",
                Category::Educational,
            ),
            (
                r"behind|bts|team|office|studio|process|workspace",
                Category::Bts,
            ),
            (
                r"celebrat|party|congrat|cheers|achievement|win",
                Category::Celebration,
            ),
        ]
        .into_iter()
        .map(|(pattern, category)| {
            (
                Regex::new(pattern).expect("hardcoded classifier pattern"),
                category,
            )
        })
        .collect()
    })
}

/// Classifies an image file name into a caption category and derives the
/// placeholder values for it. `None` or an unrecognized name falls back to
/// the engagement category.
pub fn classify(file_name: Option<&str>) -> Classification {
    let cleaned = file_name.map(clean_name).unwrap_or_default();
    let category = if cleaned.is_empty() {
        Category::Engagement
    } else {
        rules()
            .iter()
            .find(|(pattern, _)| pattern.is_match(&cleaned))
            .map(|(_, category)| *category)
            .unwrap_or(Category::Engagement)
    };
    Classification {
        category,
        placeholders: default_placeholders(category, &cleaned),
    }
}

/// Placeholder values for a category picked by the caller rather than by the
/// rules, still derived from the file name where it matters (product names).
pub fn placeholders_for(category: Category, file_name: Option<&str>) -> BTreeMap<String, String> {
    let cleaned = file_name.map(clean_name).unwrap_or_default();
    default_placeholders(category, &cleaned)
}

/// "new-product-sale.png" becomes "New Product Sale", used for alt text.
pub fn humanize_file_name(file_name: &str) -> String {
    title_case(&clean_name(file_name))
}

/// Lowercases, strips the final extension and turns `-`/`_` into spaces so
/// the keyword rules see plain words.
fn clean_name(file_name: &str) -> String {
    let lowered = file_name.trim().to_lowercase();
    let stem = match lowered.rfind('.') {
        Some(idx) => &lowered[..idx],
        None => lowered.as_str(),
    };
    stem.replace(['-', '_'], " ").trim().to_string()
}

/// Uppercases the first letter of each word, used for product names derived
/// from file names and for alt text.
pub fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fixed placeholder values per category. Same input name, same output map;
/// calendar-dependent values (DATE, MONTH, YEAR, BRAND) are layered on by the
/// caption service so this stays a pure function.
fn default_placeholders(category: Category, cleaned: &str) -> BTreeMap<String, String> {
    let pairs: Vec<(&str, String)> = match category {
        Category::Product => {
            let name = if cleaned.is_empty() {
                "Our Latest Product".to_string()
            } else {
                title_case(cleaned)
            };
            vec![
                ("PRODUCT_NAME", name.clone()),
                ("PRODUCT", name),
                ("BENEFIT", "streamline your workflow".to_string()),
                ("BENEFIT_1", "Saves hours every single week".to_string()),
                ("BENEFIT_2", "Works right out of the box".to_string()),
                ("BENEFIT_3", "Scales with your team".to_string()),
                ("VALUE", "innovation".to_string()),
                ("LINK", "Link in bio".to_string()),
            ]
        }
        Category::Promotion => vec![
            ("DISCOUNT", "20".to_string()),
            ("TIME", "48 hours".to_string()),
            ("CODE", "SAVE20".to_string()),
            ("LINK", "Shop now - link in bio".to_string()),
            ("DAYS", "14".to_string()),
            ("PRODUCT", "our platform".to_string()),
        ],
        Category::Seasonal => vec![
            ("HOLIDAY", "the season".to_string()),
            ("GOAL_1", "Ship faster".to_string()),
            ("GOAL_2", "Listen closer to our community".to_string()),
            ("GOAL_3", "Grow together".to_string()),
        ],
        Category::Milestone => vec![
            ("NUMBER", "1,000".to_string()),
            ("MILESTONE", "followers".to_string()),
            ("STORY", "from a small idea".to_string()),
            ("IMPACT", "reaching this many of you".to_string()),
        ],
        Category::Educational => vec![
            ("TIP_TITLE", "Pro Tip".to_string()),
            ("TIP_SHORT", "Consistency beats intensity.".to_string()),
            (
                "TIP_CONTENT",
                "Consistency beats intensity. Show up every day and let the compound effect do the heavy lifting.".to_string(),
            ),
            ("BENEFIT_1", "Builds momentum".to_string()),
            ("BENEFIT_2", "Compounds over time".to_string()),
            ("BENEFIT_3", "Keeps you visible".to_string()),
        ],
        Category::Bts => vec![
            (
                "CONTENT",
                "A peek at what we are building this week.".to_string(),
            ),
            (
                "CONTENT_SHORT",
                "what we are building this week".to_string(),
            ),
            ("ACTIVITY", "shipping a release".to_string()),
            ("DETAIL_1", "Whiteboards full of ideas".to_string()),
            ("DETAIL_2", "Code reviews over coffee".to_string()),
            ("DETAIL_3", "Small wins, every day".to_string()),
        ],
        Category::Celebration => vec![("REASON", "a big win for the team".to_string())],
        Category::Engagement => vec![(
            "QUESTION",
            "What are you working on this week?".to_string(),
        )],
    };
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}
