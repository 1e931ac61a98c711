use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Content category a caption template (and the classifier) speaks for.
/// Every category the classifier can emit has at least one template here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Product,
    Promotion,
    Seasonal,
    Milestone,
    Educational,
    Bts,
    Celebration,
    Engagement,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Product => "product",
            Category::Promotion => "promotion",
            Category::Seasonal => "seasonal",
            Category::Milestone => "milestone",
            Category::Educational => "educational",
            Category::Bts => "bts",
            Category::Celebration => "celebration",
            Category::Engagement => "engagement",
        }
    }

    /// Parses a category name from a request. `behind-the-scenes` is accepted
    /// as an alias for `bts`.
    pub fn parse(raw: &str) -> Option<Category> {
        match raw.trim().to_lowercase().as_str() {
            "product" => Some(Category::Product),
            "promotion" => Some(Category::Promotion),
            "seasonal" => Some(Category::Seasonal),
            "milestone" => Some(Category::Milestone),
            "educational" => Some(Category::Educational),
            "bts" | "behind-the-scenes" => Some(Category::Bts),
            "celebration" => Some(Category::Celebration),
            "engagement" => Some(Category::Engagement),
            _ => None,
        }
    }
}

/// A static caption pattern with per-destination variants. Bracketed tokens
/// like `[PRODUCT_NAME]` are substituted by [`fill_template`].
pub struct CaptionTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub telegram: &'static str,
    pub x: &'static str,
    pub linkedin: &'static str,
    pub hashtags: &'static [&'static str],
}

pub const TEMPLATE_LIBRARY: &[CaptionTemplate] = &[
    // PRODUCT LAUNCHES
    CaptionTemplate {
        id: "product-launch-1",
        name: "New Product Drop",
        category: Category::Product,
        telegram: "🚀 Introducing our latest creation!\n\n[PRODUCT_NAME] is here to transform how you [BENEFIT]. Ready to experience the difference?\n\n[LINK]",
        x: "🚀 New drop: [PRODUCT_NAME]\n\nTransform your [BENEFIT] game.\n\n[LINK]",
        linkedin: "✨ Excited to announce the launch of [PRODUCT_NAME]!\n\nAfter months of development and testing, we are bringing you a solution that helps you [BENEFIT].\n\nThis represents our commitment to [VALUE] and delivering real results for our community.\n\nWhat features would you love to see next? Drop your thoughts below! 👇\n\n[LINK]",
        hashtags: &["#productlaunch", "#innovation", "#newproduct", "#tech", "#solution"],
    },
    CaptionTemplate {
        id: "product-feature-1",
        name: "Feature Spotlight",
        category: Category::Product,
        telegram: "⚡ Feature Spotlight\n\nDid you know [PRODUCT_NAME] can do more than you think?\n\nHere is how it works:\n✓ [BENEFIT_1]\n✓ [BENEFIT_2]\n✓ [BENEFIT_3]\n\nTry it today!",
        x: "⚡ [PRODUCT_NAME] tip:\n\n[BENEFIT_1].\n\nGame changer. 🚀",
        linkedin: "⚡ Feature Spotlight: [PRODUCT_NAME]\n\nOne of our favorite capabilities is often overlooked, but it should not be.\n\nHere is why teams love it:\n\n✅ [BENEFIT_1]\n✅ [BENEFIT_2]\n✅ [BENEFIT_3]\n\nWhat is your favorite feature? Let us know in the comments!",
        hashtags: &["#productfeatures", "#howto", "#tips", "#productivity"],
    },
    // PROMOTIONS
    CaptionTemplate {
        id: "sale-promo-1",
        name: "Limited Time Offer",
        category: Category::Promotion,
        telegram: "🔥 FLASH SALE\n\n[DISCOUNT]% OFF everything!\n\n⏰ Ends in [TIME]\n🎁 Use code: [CODE]\n\nDo not miss out → [LINK]",
        x: "🔥 [DISCOUNT]% OFF flash sale\n\nCode: [CODE]\n⏰ Ends [TIME]\n\n[LINK]",
        linkedin: "🔥 Limited Time Opportunity\n\nWe are offering [DISCOUNT]% off for the next [TIME].\n\nUse code [CODE] at checkout.\n\n[LINK]\n\nOffer ends soon. Tag someone who needs to see this!",
        hashtags: &["#sale", "#discount", "#limitedtime", "#offer", "#save"],
    },
    CaptionTemplate {
        id: "free-trial-1",
        name: "Free Trial Offer",
        category: Category::Promotion,
        telegram: "🎁 Try before you buy!\n\nGet [DAYS] days of [PRODUCT] FREE. No credit card required.\n\n👉 [LINK]",
        x: "🎁 Free [DAYS]-day trial\n\nNo CC required.\n\nSee what [PRODUCT] can do.\n\n[LINK]",
        linkedin: "🎁 Experience [PRODUCT] Risk-Free\n\nWe are so confident you will love [PRODUCT] that we are offering [DAYS] days completely free.\n\nNo credit card. No obligations. Just results.\n\n[LINK]",
        hashtags: &["#freetrial", "#trybeforeyoubuy", "#demo", "#saas"],
    },
    // SEASONAL
    CaptionTemplate {
        id: "new-month-1",
        name: "New Month Fresh Start",
        category: Category::Seasonal,
        telegram: "🌟 Happy [MONTH]!\n\nNew month, new goals, new opportunities. What are you building this month?",
        x: "🌟 [MONTH] is here\n\nNew goals. New wins.\n\nWhat are you building? 👇",
        linkedin: "🌟 Welcome, [MONTH]!\n\nAs we turn the page to a new month, it is the perfect time to reflect and reset.\n\nOur team is focused on:\n• [GOAL_1]\n• [GOAL_2]\n• [GOAL_3]\n\nWhat are your priorities for [MONTH]? Share below!",
        hashtags: &["#newmonth", "#goals", "#freshstart", "#motivation"],
    },
    CaptionTemplate {
        id: "holiday-1",
        name: "Holiday Greeting",
        category: Category::Seasonal,
        telegram: "🎄 Happy [HOLIDAY]!\n\nWishing you and yours a wonderful celebration.\n\nFrom all of us at [BRAND] 💚",
        x: "🎄 Happy [HOLIDAY]!\n\nWishing you joy and rest.\n\nFrom [BRAND] 💚",
        linkedin: "🎄 Season's Greetings from [BRAND]\n\nAs we celebrate [HOLIDAY], we want to express our gratitude for our incredible community, partners, and team.\n\nHere is to a prosperous [YEAR] ahead! 🥂",
        hashtags: &["#holiday", "#seasonsgreetings", "#celebration"],
    },
    // MILESTONES
    CaptionTemplate {
        id: "milestone-1",
        name: "Company Milestone",
        category: Category::Milestone,
        telegram: "🎉 [NUMBER] [MILESTONE]!\n\nThank you to everyone who has been part of this journey.\n\nHere is to the next chapter 🚀",
        x: "🎉 We hit [NUMBER] [MILESTONE]!\n\nCould not have done it without you.\n\nNext stop: bigger goals 🚀",
        linkedin: "🎉 [NUMBER] [MILESTONE] Achieved!\n\nToday marks a significant milestone for [BRAND], and we could not have done it without our community.\n\nWhen we started [STORY], we never imagined [IMPACT].\n\nThank you for being part of our journey. The best is yet to come! 🚀",
        hashtags: &["#milestone", "#celebration", "#growth", "#thankyou"],
    },
    // EDUCATIONAL
    CaptionTemplate {
        id: "tip-1",
        name: "Quick Tip",
        category: Category::Educational,
        telegram: "💡 Quick Tip\n\n[TIP_CONTENT]\n\nSave this for later! 📌",
        x: "💡 [TIP_TITLE]\n\n[TIP_SHORT]\n\nRT to save 📌",
        linkedin: "💡 [TIP_TITLE]: A Strategy That Works\n\n[TIP_CONTENT]\n\nWhy this matters:\n✓ [BENEFIT_1]\n✓ [BENEFIT_2]\n✓ [BENEFIT_3]\n\nHave you tried this? What is your experience?",
        hashtags: &["#tips", "#strategy", "#protips", "#education"],
    },
    CaptionTemplate {
        id: "myth-1",
        name: "Myth Buster",
        category: Category::Educational,
        telegram: "❌ MYTH: [MYTH]\n\n✅ TRUTH: [TRUTH]\n\nDo not fall for common misconceptions. Here is what you need to know 👇",
        x: "❌ Myth: [MYTH]\n✅ Truth: [TRUTH]\n\nStop believing this.\n\nHere is why 👇",
        linkedin: "❌ MYTH vs ✅ REALITY\n\nThere is a dangerous misconception out there:\n\n❌ \"[MYTH]\"\n\nThe reality?\n\n✅ [TRUTH]\n\nWhat myths have you encountered? Let us debunk them together!",
        hashtags: &["#mythbusters", "#facts", "#truth"],
    },
    // BEHIND THE SCENES
    CaptionTemplate {
        id: "bts-1",
        name: "Behind the Scenes",
        category: Category::Bts,
        telegram: "🔧 Behind the scenes\n\n[CONTENT]\n\nThe work you do not usually see 🎬",
        x: "🔧 BTS:\n\n[CONTENT_SHORT]\n\nThe messy middle.",
        linkedin: "🔧 Behind the Scenes at [BRAND]\n\n[CONTENT]\n\nSuccess looks effortless from the outside, but here is what [ACTIVITY] actually looks like:\n\n• [DETAIL_1]\n• [DETAIL_2]\n• [DETAIL_3]\n\nThe result is worth every challenge.",
        hashtags: &["#behindthescenes", "#bts", "#process", "#transparency"],
    },
    // CELEBRATIONS
    CaptionTemplate {
        id: "celebration-1",
        name: "Team Celebration",
        category: Category::Celebration,
        telegram: "🎉 Time to celebrate!\n\n[REASON]\n\nThank you for being part of it 💚",
        x: "🎉 [REASON]\n\nCheers to this community 🥂",
        linkedin: "🎉 Celebrating [REASON]\n\nMoments like this are why we do what we do at [BRAND].\n\nThank you to everyone who made it happen.",
        hashtags: &["#celebration", "#community", "#grateful"],
    },
    // ENGAGEMENT
    CaptionTemplate {
        id: "question-1",
        name: "Community Question",
        category: Category::Engagement,
        telegram: "💬 We want to hear from you!\n\n[QUESTION]\n\nDrop your thoughts below 👇",
        x: "💬 Quick question:\n\n[QUESTION]\n\nLet us know 👇",
        linkedin: "💬 Community Input Needed\n\n[QUESTION]\n\nWe are building with your needs in mind, and your insights matter.\n\nShare your experience in the comments. Our team reads every single one.",
        hashtags: &["#community", "#feedback", "#question", "#engagement"],
    },
    CaptionTemplate {
        id: "testimonial-1",
        name: "Customer Win",
        category: Category::Engagement,
        telegram: "💚 Customer Win\n\n\"[TESTIMONIAL]\"\n\n— [CUSTOMER_NAME]\n\nResults like these fuel our mission 🙏",
        x: "\"[TESTIMONIAL]\"\n\n— [CUSTOMER_NAME]\n\nThis is why we do what we do. 💚",
        linkedin: "💚 Customer Success Story\n\n\"[TESTIMONIAL]\"\n\n— [CUSTOMER_NAME]\n\nWant similar results? Let us talk: [LINK]",
        hashtags: &["#testimonial", "#casestudy", "#success", "#socialproof"],
    },
];

/// First template registered for the category. Falls back to the first
/// engagement template so selection can never come up empty.
pub fn first_for_category(category: Category) -> &'static CaptionTemplate {
    TEMPLATE_LIBRARY
        .iter()
        .find(|t| t.category == category)
        .or_else(|| {
            TEMPLATE_LIBRARY
                .iter()
                .find(|t| t.category == Category::Engagement)
        })
        .expect("template library contains an engagement template")
}

/// Replaces every occurrence of every `[KEY]` present in `values`. Tokens the
/// map does not know stay in the output verbatim, so a caption can carry
/// leftover brackets when a placeholder was not supplied.
pub fn fill_template(template: &str, values: &BTreeMap<String, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in values {
        result = result.replace(&format!("[{}]", key), value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn fills_every_occurrence_of_a_token() {
        let out = fill_template(
            "[NAME] meets [NAME] at [PLACE]",
            &values(&[("NAME", "Ada"), ("PLACE", "the lab")]),
        );
        assert_eq!(out, "Ada meets Ada at the lab");
    }

    #[test]
    fn unknown_tokens_stay_verbatim() {
        let out = fill_template("Use code [CODE] before [DEADLINE]", &values(&[("CODE", "SAVE20")]));
        assert_eq!(out, "Use code SAVE20 before [DEADLINE]");
    }

    #[test]
    fn filling_twice_is_idempotent() {
        let map = values(&[("DISCOUNT", "20"), ("TIME", "48 hours")]);
        let once = fill_template("[DISCOUNT]% off, ends in [TIME]", &map);
        let twice = fill_template(&once, &map);
        assert_eq!(once, twice);
    }

    #[test]
    fn token_match_is_case_sensitive() {
        let out = fill_template("[code] vs [CODE]", &values(&[("CODE", "SAVE20")]));
        assert_eq!(out, "[code] vs SAVE20");
    }

    #[test]
    fn every_category_resolves_to_a_template() {
        for category in [
            Category::Product,
            Category::Promotion,
            Category::Seasonal,
            Category::Milestone,
            Category::Educational,
            Category::Bts,
            Category::Celebration,
            Category::Engagement,
        ] {
            let template = first_for_category(category);
            assert_eq!(template.category, category);
            assert!(!template.hashtags.is_empty());
        }
    }

    #[test]
    fn category_parse_accepts_the_bts_alias() {
        assert_eq!(Category::parse("behind-the-scenes"), Some(Category::Bts));
        assert_eq!(Category::parse("Product"), Some(Category::Product));
        assert_eq!(Category::parse("unknown"), None);
    }
}
