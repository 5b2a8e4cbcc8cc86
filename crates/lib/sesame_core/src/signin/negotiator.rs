//! Login layout from configured and reported sign-in options.

use super::UnsupportedMechanism;
use crate::config::{AuthTypeSetting, LoginUiConfig, UiConfig};
use crate::models::sign_in::SignInOption;
use crate::routes;

/// One renderable login element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginElement {
    /// Username and password fields with a submit button.
    PasswordForm { ui: LoginUiConfig },
    /// A link-style button that leaves for `href`.
    Button {
        option: SignInOption,
        href: String,
        ui: LoginUiConfig,
    },
}

static PASSWORD_OPTION: SignInOption = SignInOption::Basic;

impl LoginElement {
    pub fn option(&self) -> &SignInOption {
        match self {
            Self::PasswordForm { .. } => &PASSWORD_OPTION,
            Self::Button { option, .. } => option,
        }
    }
}

/// Ordered login elements.
///
/// `primary` holds the form-like elements (password, anonymous), `secondary`
/// the federated buttons. `separator` is set when more than one element is
/// rendered and goes between the two groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginLayout {
    pub primary: Vec<LoginElement>,
    pub separator: bool,
    pub secondary: Vec<LoginElement>,
    pub errors: Vec<UnsupportedMechanism>,
}

impl LoginLayout {
    /// All elements in render order.
    pub fn elements(&self) -> impl Iterator<Item = &LoginElement> {
        self.primary.iter().chain(self.secondary.iter())
    }

    /// Message listing every unsupported tag, if any.
    pub fn error_message(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        Some(
            self.errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" "),
        )
    }
}

/// Mechanisms to offer: the reported options, or the configured ones when
/// the backend reports none. A blank configuration means password login.
pub fn mechanisms(configured: &AuthTypeSetting, reported: &[SignInOption]) -> Vec<SignInOption> {
    if !reported.is_empty() {
        return reported.to_vec();
    }
    match configured {
        AuthTypeSetting::Single(tag) if tag.trim().is_empty() => vec![SignInOption::Basic],
        AuthTypeSetting::Single(tag) => vec![SignInOption::from_tag(tag)],
        AuthTypeSetting::Many(tags) if tags.iter().all(|t| t.trim().is_empty()) => {
            vec![SignInOption::Basic]
        }
        AuthTypeSetting::Many(tags) => tags
            .iter()
            .filter(|t| !t.trim().is_empty())
            .map(|t| SignInOption::from_tag(t))
            .collect(),
    }
}

/// Builds the login layout for one page render.
#[derive(Debug, Clone)]
pub struct SignInOptionNegotiator<'a> {
    ui: &'a UiConfig,
    base_path: &'a str,
}

impl<'a> SignInOptionNegotiator<'a> {
    pub fn new(ui: &'a UiConfig, base_path: &'a str) -> Self {
        Self { ui, base_path }
    }

    /// `next_url_query` is appended to federated login links
    /// (e.g. `?nextUrl=%2Fapp%2Fhome`).
    pub fn negotiate(
        &self,
        configured: &AuthTypeSetting,
        reported: &[SignInOption],
        next_url_query: &str,
    ) -> LoginLayout {
        let mut layout = LoginLayout::default();

        for option in mechanisms(configured, reported) {
            match option {
                SignInOption::Basic => layout.primary.push(LoginElement::PasswordForm {
                    ui: self.ui.basicauth.login.clone(),
                }),
                SignInOption::Anonymous => layout.primary.push(LoginElement::Button {
                    option,
                    href: self.href(routes::GET_AUTH_ANONYMOUS, ""),
                    ui: self.ui.anonymous.login.clone(),
                }),
                SignInOption::OpenId => layout.secondary.push(LoginElement::Button {
                    option,
                    href: self.href(routes::GET_AUTH_OPENID_LOGIN, next_url_query),
                    ui: self.ui.openid.login.clone(),
                }),
                SignInOption::Saml => layout.secondary.push(LoginElement::Button {
                    option,
                    href: self.href(routes::GET_AUTH_SAML_LOGIN, next_url_query),
                    ui: self.ui.saml.login.clone(),
                }),
                SignInOption::Unsupported(tag) => {
                    layout.errors.push(UnsupportedMechanism { tag });
                }
            }
        }

        layout.separator = layout.primary.len() + layout.secondary.len() > 1;
        layout
    }

    fn href(&self, path: &str, query: &str) -> String {
        format!("{}{query}", routes::with_base_path(self.base_path, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(tag: &str) -> AuthTypeSetting {
        AuthTypeSetting::Single(tag.into())
    }

    #[test]
    fn reported_options_take_precedence() {
        let got = mechanisms(&single("saml"), &[SignInOption::Basic]);
        assert_eq!(got, vec![SignInOption::Basic]);
    }

    #[test]
    fn falls_back_to_configured_single_string() {
        assert_eq!(mechanisms(&single("openid"), &[]), vec![SignInOption::OpenId]);
        assert_eq!(mechanisms(&single(""), &[]), vec![SignInOption::Basic]);
        assert_eq!(mechanisms(&single("  "), &[]), vec![SignInOption::Basic]);
    }

    #[test]
    fn falls_back_to_configured_list() {
        let list = AuthTypeSetting::Many(vec!["basicauth".into(), "saml".into()]);
        assert_eq!(
            mechanisms(&list, &[]),
            vec![SignInOption::Basic, SignInOption::Saml]
        );
        assert_eq!(
            mechanisms(&AuthTypeSetting::Many(vec![String::new()]), &[]),
            vec![SignInOption::Basic]
        );
        assert_eq!(
            mechanisms(&AuthTypeSetting::Many(vec![]), &[]),
            vec![SignInOption::Basic]
        );
    }

    #[test]
    fn single_password_form_has_no_separator() {
        let ui = UiConfig::default();
        let layout = SignInOptionNegotiator::new(&ui, "").negotiate(&single(""), &[], "");
        assert_eq!(layout.primary.len(), 1);
        assert!(layout.secondary.is_empty());
        assert!(!layout.separator);
        assert!(layout.error_message().is_none());
    }

    #[test]
    fn federated_buttons_go_below_separator() {
        let ui = UiConfig::default();
        let layout = SignInOptionNegotiator::new(&ui, "/dash").negotiate(
            &single(""),
            &[
                SignInOption::OpenId,
                SignInOption::Basic,
                SignInOption::Anonymous,
            ],
            "?nextUrl=%2F",
        );

        assert!(layout.separator);
        assert_eq!(
            layout.primary.iter().map(LoginElement::option).collect::<Vec<_>>(),
            vec![&SignInOption::Basic, &SignInOption::Anonymous]
        );
        match &layout.secondary[..] {
            [LoginElement::Button { option, href, .. }] => {
                assert_eq!(option, &SignInOption::OpenId);
                assert_eq!(href, "/dash/auth/openid/captureUrlFragment?nextUrl=%2F");
            }
            other => panic!("unexpected secondary group: {other:?}"),
        }
        match &layout.primary[1] {
            LoginElement::Button { href, .. } => assert_eq!(href, "/dash/auth/anonymous"),
            other => panic!("unexpected element: {other:?}"),
        }
    }

    #[test]
    fn unsupported_tags_become_errors() {
        let ui = UiConfig::default();
        let layout = SignInOptionNegotiator::new(&ui, "").negotiate(
            &single(""),
            &[SignInOption::Basic, SignInOption::from_tag("kerberos")],
            "",
        );
        assert_eq!(layout.elements().count(), 1);
        assert!(!layout.separator);
        assert_eq!(
            layout.error_message().as_deref(),
            Some("Authentication Type: kerberos is not supported for multiple authentication.")
        );
    }

    #[test]
    fn unsupported_configured_tag_is_reported() {
        let ui = UiConfig::default();
        let layout = SignInOptionNegotiator::new(&ui, "").negotiate(&single("jwt"), &[], "");
        assert_eq!(layout.elements().count(), 0);
        assert_eq!(
            layout.errors,
            vec![UnsupportedMechanism { tag: "jwt".into() }]
        );
    }

    #[test]
    fn button_ui_comes_from_config() {
        let mut ui = UiConfig::default();
        ui.saml.login.button_name = "Corporate SSO".into();
        let layout =
            SignInOptionNegotiator::new(&ui, "").negotiate(&single(""), &[SignInOption::Saml], "");
        match &layout.secondary[0] {
            LoginElement::Button { ui, .. } => assert_eq!(ui.button_name, "Corporate SSO"),
            other => panic!("unexpected element: {other:?}"),
        }
    }
}
