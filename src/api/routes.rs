//! Named routes
//!
//! Every page has a stable name (`news:detail`, `notes:edit`, ...) that
//! resolves to its URL, so redirects and tests never hard-code paths.

/// News home page
pub const NEWS_HOME: &str = "/news/";
/// News item with its comments; POST adds a comment
pub const NEWS_DETAIL: &str = "/news/{id}/";
pub const NEWS_EDIT: &str = "/news/comments/{id}/edit/";
pub const NEWS_DELETE: &str = "/news/comments/{id}/delete/";

pub const NOTES_HOME: &str = "/notes/";
/// The requester's own notes
pub const NOTES_LIST: &str = "/notes/all/";
pub const NOTES_ADD: &str = "/notes/add/";
pub const NOTES_SUCCESS: &str = "/notes/done/";
pub const NOTES_DETAIL: &str = "/notes/note/{slug}/";
pub const NOTES_EDIT: &str = "/notes/edit/{slug}/";
pub const NOTES_DELETE: &str = "/notes/delete/{slug}/";

pub const USERS_LOGIN: &str = "/auth/login/";
pub const USERS_LOGOUT: &str = "/auth/logout/";
pub const USERS_SIGNUP: &str = "/auth/signup/";

/// Route name to path pattern
const ROUTES: &[(&str, &str)] = &[
    ("news:home", NEWS_HOME),
    ("news:detail", NEWS_DETAIL),
    ("news:edit", NEWS_EDIT),
    ("news:delete", NEWS_DELETE),
    ("notes:home", NOTES_HOME),
    ("notes:list", NOTES_LIST),
    ("notes:add", NOTES_ADD),
    ("notes:success", NOTES_SUCCESS),
    ("notes:detail", NOTES_DETAIL),
    ("notes:edit", NOTES_EDIT),
    ("notes:delete", NOTES_DELETE),
    ("users:login", USERS_LOGIN),
    ("users:logout", USERS_LOGOUT),
    ("users:signup", USERS_SIGNUP),
];

/// Route resolution errors
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    #[error("Route '{name}' takes {expected} argument(s), got {given}")]
    ArgumentCount {
        name: String,
        expected: usize,
        given: usize,
    },
}

/// Resolve a route name and its positional arguments to a URL path.
///
/// Arguments are percent-encoded.
pub fn reverse(name: &str, args: &[&str]) -> Result<String, RouteError> {
    let pattern = ROUTES
        .iter()
        .find(|(route, _)| *route == name)
        .map(|(_, pattern)| *pattern)
        .ok_or_else(|| RouteError::UnknownRoute(name.to_string()))?;

    let expected = pattern.matches('{').count();
    if expected != args.len() {
        return Err(RouteError::ArgumentCount {
            name: name.to_string(),
            expected,
            given: args.len(),
        });
    }

    let mut path = String::with_capacity(pattern.len());
    let mut rest = pattern;
    for arg in args {
        // Placeholders are always well formed in the table above.
        let (Some(open), Some(close)) = (rest.find('{'), rest.find('}')) else {
            break;
        };
        path.push_str(&rest[..open]);
        path.push_str(&urlencoding::encode(arg));
        rest = &rest[close + 1..];
    }
    path.push_str(rest);

    Ok(path)
}

/// Login page that sends the user back to `next` afterwards.
///
/// Slashes in `next` stay literal: `/auth/login/?next=/notes/add/`.
pub fn login_url(next: &str) -> String {
    format!(
        "{}?next={}",
        USERS_LOGIN,
        urlencoding::encode(next).replace("%2F", "/")
    )
}

/// Whether `next` is a path on this site and safe to redirect to
pub fn is_local_path(next: &str) -> bool {
    next.starts_with('/') && !next.starts_with("//") && !next.contains('\\')
}
