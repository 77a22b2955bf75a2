//! UI strings for the login page.

pub const LOGIN_BOX: &str = "Login_Box";
pub const LOGIN_PASSWORD_PLACEHOLDER: &str = "Login_Psw-box";
pub const LOGIN_SUBMIT: &str = "Login_Submit";
pub const LOGIN_TOGGLE_INFO: &str = "Login_Toggle_Info";
pub const LOGIN_INFO_HEADLINE: &str = "Login_Toggle_Info_headline";
pub const LOGIN_INFO: &str = "Login_Info";
pub const LOGIN_ALERT_HEADLINE: &str = "Login_Toggle_Alert_headline";
pub const LOGIN_DEFAULT_PASSWORD: &str = "Login_Default_PWD";

pub trait Localizer: Send + Sync {
    fn lookup(&self, key: &str) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishLocalizer;

impl Localizer for EnglishLocalizer {
    fn lookup(&self, key: &str) -> String {
        let text = match key {
            LOGIN_BOX => "Enter your password",
            LOGIN_PASSWORD_PLACEHOLDER => "Password",
            LOGIN_SUBMIT => "Log in",
            LOGIN_TOGGLE_INFO => "Password information",
            LOGIN_INFO_HEADLINE => "Password information",
            LOGIN_INFO => "Passwords are set in the application settings.",
            LOGIN_ALERT_HEADLINE => "Password alert!",
            LOGIN_DEFAULT_PASSWORD => {
                "The default password '123456' is still active. Change it in the application settings."
            }
            other => other,
        };
        text.to_string()
    }
}

/// Which notice the login page shows under the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginNotice {
    Info,
    /// The configured password is still the shipped default.
    DefaultPasswordWarning,
}

impl LoginNotice {
    #[must_use]
    pub const fn headline_key(self) -> &'static str {
        match self {
            Self::Info => LOGIN_INFO_HEADLINE,
            Self::DefaultPasswordWarning => LOGIN_ALERT_HEADLINE,
        }
    }

    #[must_use]
    pub const fn body_key(self) -> &'static str {
        match self {
            Self::Info => LOGIN_INFO,
            Self::DefaultPasswordWarning => LOGIN_DEFAULT_PASSWORD,
        }
    }

    #[must_use]
    pub const fn alert_class(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::DefaultPasswordWarning => "danger",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Info => "fa-info",
            Self::DefaultPasswordWarning => "fa-ban",
        }
    }

    /// The info notice is collapsed until toggled, the warning is not.
    #[must_use]
    pub const fn initially_visible(self) -> bool {
        matches!(self, Self::DefaultPasswordWarning)
    }
}
