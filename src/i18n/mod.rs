//! Language handling for host/guest translation.
//!
//! Everything that knows about languages, locales and writing style lives here:
//!
//! - `registry`: the locales a host can pick for a reply, with their prompt hints
//! - `language`: validated BCP-47 style language tags
//! - `tone`: reply tone and its style guide
//! - `validator`: script-based check that an output is in the expected language
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::i18n::{LanguageTag, LocaleRegistry, Tone};
//!
//! let target = LanguageTag::parse("zh-hant")?;
//! assert_eq!(target.as_str(), "zh-Hant");
//! let hint = target.locale().map(|l| l.hint);
//! let guide = Tone::Formal.guide();
//! ```

mod language;
mod registry;
mod tone;
mod validator;

pub use language::{language_name, LanguageTag};
pub use registry::{LocaleConfig, LocaleRegistry};
pub use tone::Tone;
pub use validator::{ScriptCounts, TranslationValidator};
