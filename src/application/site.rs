//! Element queries and scripts for the member booking site.

use crate::domain::model::LocationId;
use crate::infrastructure::browser::{xpath_literal, Selector};

/// "Member log in" button shown to signed-out visitors.
pub fn login_entry() -> Selector {
    Selector::xpath(r#"//button[text()="Member log in"]"#)
}

/// City selector rendered only on the signed-in reservation view.
pub fn reserve_marker() -> Selector {
    Selector::css("wework-member-web-city-selector")
}

const EMAIL_INPUT: &str = r#"input[type="email"][id="1-email"]"#;

pub fn email_input() -> Selector {
    Selector::css(EMAIL_INPUT)
}

/// Username field the member still has to fill in.
pub fn email_input_editable() -> Selector {
    Selector::css(format!("{}:not([readonly])", EMAIL_INPUT))
}

/// Username field pre-filled by the identity provider and locked.
pub fn email_input_prefilled() -> Selector {
    Selector::css(format!("{}[readonly]", EMAIL_INPUT))
}

pub fn password_input() -> Selector {
    Selector::css(r#"input[type="password"][id="1-password"]"#)
}

pub fn login_submit() -> Selector {
    Selector::css(r#"button[type="submit"][id="1-submit"]"#)
}

pub fn date_input() -> Selector {
    Selector::css("yardi-control-date input")
}

/// Placeholder list shown while the listing reloads for a new date.
pub fn listing_loading() -> Selector {
    Selector::css("#main-content .loading-block")
}

/// Listing entry whose title text equals `name`.
pub fn location_item_by_name(name: &str) -> Selector {
    Selector::xpath(format!("//div[text()={}]/ancestor::li", xpath_literal(name)))
}

fn css_attr_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

pub fn location_item(id: &LocationId) -> Selector {
    Selector::css(format!(
        r#"#main-content li[id="{}"]"#,
        css_attr_value(id.as_str())
    ))
}

/// The "book" control of a listing entry is a span with a click handler that ignores
/// synthetic mouse events, so it is clicked from script.
pub fn location_book_script(id: &LocationId) -> String {
    let query = format!(
        r#"li[id="{}"] span[role="button"]"#,
        css_attr_value(id.as_str())
    );
    let literal = serde_json::to_string(&query).unwrap_or_else(|_| "\"\"".to_string());
    format!("document.querySelector({}).click()", literal)
}

pub fn booking_cost() -> Selector {
    Selector::css("memberweb-booking-review-modal .btn-primary .cost")
}

pub fn booking_confirm() -> Selector {
    Selector::css("memberweb-booking-review-modal .btn-primary")
}

/// Confirmation offered when the member is short on credits.
pub fn insufficient_credits_confirm() -> Selector {
    Selector::css("memberweb-insufficient-credits-modal .btn-primary")
}

pub fn done_button() -> Selector {
    Selector::xpath(r#"//button[text()="Done"]"#)
}

/// Header control of the day view; switches the picker to the month list.
pub fn calendar_month_list_switch() -> Selector {
    Selector::css(".datepicker-days .datepicker-switch")
}

/// Header control of the month list; switches the picker to the year list.
pub fn calendar_year_list_switch() -> Selector {
    Selector::css(".datepicker-months .datepicker-switch")
}

pub fn calendar_year(year: i32) -> Selector {
    Selector::xpath(format!(
        r#"//div[contains(@class,"datepicker-years")]//span[contains(@class,"year") and normalize-space()="{}"]"#,
        year
    ))
}

/// Month cell of the month list, by abbreviated name ("Mar").
pub fn calendar_month(label: &str) -> Selector {
    Selector::xpath(format!(
        r#"//div[contains(@class,"datepicker-months")]//span[contains(@class,"month") and normalize-space()="{}"]"#,
        label
    ))
}

/// Day cells carry their full date as accessible name, e.g. "Jan 20, 2025".
pub fn calendar_day(label: &str) -> Selector {
    Selector::css(format!(r#"[aria-label="{}"]"#, label))
}

/// Reads the access token the single-page app caches in local storage.
pub const BEARER_TOKEN_SCRIPT: &str = r#"(function() {
    const baseItems = localStorage.getItem('Auth0Config');
    if (!baseItems) {
        throw new Error("could not find Auth0Config in local storage");
    }
    const config = JSON.parse(baseItems);
    const { clientId, authorizationParams: { scope } } = config;
    const items = localStorage.getItem('@@auth0spajs@@::' + clientId + '::wework::openid ' + scope);
    if (!items) {
        throw new Error("could not find auth0 items in local storage");
    }
    return JSON.parse(items).body.access_token;
})()"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_selectors_escape_quotes() {
        let id = LocationId::new(r#"a"b"#);
        assert_eq!(location_item(&id).as_str(), r#"#main-content li[id="a\"b"]"#);
        assert_eq!(
            location_book_script(&LocationId::new("li-7")),
            r#"document.querySelector("li[id=\"li-7\"] span[role=\"button\"]").click()"#
        );
    }

    #[test]
    fn test_location_by_name_uses_xpath_literal() {
        assert_eq!(
            location_item_by_name("Joe's Hub").as_str(),
            r#"//div[text()="Joe's Hub"]/ancestor::li"#
        );
    }

    #[test]
    fn test_calendar_day_label() {
        let date = crate::domain::model::TargetDate::from_ymd(2025, 3, 3).unwrap();
        assert_eq!(
            calendar_day(&date.label()).as_str(),
            r#"[aria-label="Mar 3, 2025"]"#
        );
    }
}
