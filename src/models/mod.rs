/// A text column held a value outside the enum it maps to
#[derive(thiserror::Error, Debug)]
#[error("unknown {kind} {value:?}")]
pub struct ParseValueError {
    pub kind: &'static str,
    pub value: String,
}

/// Enums stored as snake_case TEXT columns.
macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::models::ParseValueError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::models::ParseValueError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::models::ParseValueError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

mod admin_user;
mod client;
mod contact;
mod finance;
mod job;
mod page_view;
mod portfolio;
mod time_session;

pub use admin_user::AdminUser;
pub use client::Client;
pub use contact::{Contact, ContactForm};
pub use finance::{EntryKind, EntryStatus, FinanceEntry};
pub use job::{Job, JobListing, JobStatus, PaymentStatus};
pub use page_view::PageView;
pub use portfolio::{ImageDraft, PortfolioCategory, PortfolioImage, PortfolioProject, ProjectWithImages};
pub use time_session::TimeSession;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_enums_parse_their_own_labels() {
        for status in JobStatus::ALL {
            assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), *status);
        }
        assert_eq!("paid".parse::<EntryStatus>().unwrap(), EntryStatus::Paid);
        assert!("pago".parse::<PaymentStatus>().is_err());
    }
}
