pub mod categorize;
pub mod hash;
pub mod normalize;
pub mod patterns;

pub use categorize::{KeywordCategorizer, KeywordRule};
pub use hash::{fingerprint, FINGERPRINT_LEN};
pub use normalize::clean_merchant_name;
pub use patterns::{
    MessageExtractor, CASH_WITHDRAWAL_LABEL, CREDIT_FALLBACK_LABEL, MERCHANT_FALLBACK_LABEL,
};
