use paisa_core::Category;
use serde::Deserialize;

/// One keyword set mapped to a category. The table is data: the defaults
/// below can be replaced wholesale from a TOML file without touching the
/// matching algorithm.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordRule {
    pub category: Category,
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    rules: Vec<KeywordRule>,
}

/// First-match keyword classifier over a normalized counterparty name.
///
/// Rules are tested in declared order; the first set containing any keyword
/// as a substring of the lowercased name wins. Ties resolve purely by that
/// order — never by match length or count.
pub struct KeywordCategorizer {
    rules: Vec<KeywordRule>,
}

impl KeywordCategorizer {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|r| KeywordRule {
                category: r.category,
                keywords: r.keywords.iter().map(|k| k.to_lowercase()).collect(),
            })
            .collect();
        Self { rules }
    }

    /// Load a rule table from TOML (`[[rules]]` entries with `category` and
    /// `keywords`). Declared order is priority order.
    pub fn from_toml(toml_content: &str) -> Result<Self, String> {
        let file: RuleFile =
            toml::from_str(toml_content).map_err(|e| format!("Failed to parse TOML: {e}"))?;
        Ok(Self::new(file.rules))
    }

    /// Total classification: every input maps to exactly one category.
    pub fn categorize(&self, display_name: &str, is_withdrawal: bool) -> Category {
        if is_withdrawal {
            return Category::Cash;
        }
        let name = display_name.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| name.contains(k.as_str())))
            .map(|rule| rule.category)
            .unwrap_or(Category::General)
    }
}

impl Default for KeywordCategorizer {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

fn keyword_rule(category: Category, keywords: &[&str]) -> KeywordRule {
    KeywordRule {
        category,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

/// Built-in keyword table. Priority order is the declared order:
/// Food, Travel, Shopping, Bills, Entertainment, Health, Income.
fn default_rules() -> Vec<KeywordRule> {
    vec![
        keyword_rule(
            Category::Food,
            &[
                "zomato", "swiggy", "blinkit", "zepto", "dominos", "pizza", "mcdonald", "kfc",
                "burger", "cafe", "restaurant", "biryani", "bakery", "dhaba", "food",
            ],
        ),
        keyword_rule(
            Category::Travel,
            &[
                "uber", "ola", "rapido", "irctc", "redbus", "makemytrip", "goibibo", "indigo",
                "vistara", "metro", "petrol", "fuel", "hpcl", "iocl", "bpcl", "travel",
            ],
        ),
        keyword_rule(
            Category::Shopping,
            &[
                "amazon", "flipkart", "myntra", "ajio", "nykaa", "meesho", "mall", "mart",
                "bazaar", "store", "retail", "shop",
            ],
        ),
        keyword_rule(
            Category::Bills,
            &[
                "electricity", "bescom", "recharge", "jio", "airtel", "vodafone", "bsnl",
                "broadband", "dth", "postpaid", "gas", "water", "bill",
            ],
        ),
        keyword_rule(
            Category::Entertainment,
            &[
                "netflix", "spotify", "hotstar", "prime video", "bookmyshow", "pvr", "inox",
                "cinema", "movie", "gaming", "steam",
            ],
        ),
        keyword_rule(
            Category::Health,
            &[
                "pharmacy", "apollo", "medplus", "netmeds", "pharmeasy", "hospital", "clinic",
                "diagnostic", "medical", "dental", "doctor", "health",
            ],
        ),
        keyword_rule(
            Category::Income,
            &[
                "salary", "payroll", "refund", "cashback", "interest", "dividend", "stipend",
                "bonus",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn withdrawal_is_always_cash() {
        let c = KeywordCategorizer::default();
        assert_eq!(c.categorize("Zomato", true), Category::Cash);
        assert_eq!(c.categorize("", true), Category::Cash);
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let c = KeywordCategorizer::default();
        assert_eq!(c.categorize("Zomato Limited", false), Category::Food);
        assert_eq!(c.categorize("ZOMATO LIMITED", false), Category::Food);
    }

    #[test]
    fn default_table_covers_common_merchants() {
        let c = KeywordCategorizer::default();
        assert_eq!(c.categorize("Amazon Pay India", false), Category::Shopping);
        assert_eq!(c.categorize("Uber India Systems", false), Category::Travel);
        assert_eq!(c.categorize("Airtel Postpaid", false), Category::Bills);
        assert_eq!(c.categorize("Netflix Com", false), Category::Entertainment);
        assert_eq!(c.categorize("Apollo Clinic", false), Category::Health);
        assert_eq!(c.categorize("Monthly Salary Credit", false), Category::Income);
    }

    #[test]
    fn unmatched_name_is_general_never_arbitrary() {
        let c = KeywordCategorizer::default();
        assert_eq!(c.categorize("Sharma General Provisions", false), Category::General);
        assert_eq!(c.categorize("", false), Category::General);
    }

    #[test]
    fn declared_order_breaks_ties() {
        // "travel food court" hits both Food and Travel keywords; Food is
        // declared first and must win regardless of match position or count.
        let c = KeywordCategorizer::default();
        assert_eq!(c.categorize("Travel Food Court", false), Category::Food);
    }

    #[test]
    fn table_loads_from_toml_in_declared_order() {
        let toml = r#"
            [[rules]]
            category = "Travel"
            keywords = ["express"]

            [[rules]]
            category = "Food"
            keywords = ["express"]
        "#;
        let c = KeywordCategorizer::from_toml(toml).unwrap();
        assert_eq!(c.categorize("Shatabdi Express", false), Category::Travel);
    }

    #[test]
    fn from_toml_rejects_malformed_input() {
        assert!(KeywordCategorizer::from_toml("rules = 3").is_err());
        assert!(KeywordCategorizer::from_toml("[[rules]]\ncategory = \"NotACategory\"\nkeywords = []").is_err());
    }
}
