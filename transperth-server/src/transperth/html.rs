//! Results-page scraper.
//!
//! Parses the server-rendered `Journey-Planner/Results` page. The
//! markup is undocumented and changes without notice, so every lookup
//! is tolerant: a missing cell yields an empty field, not an error.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::domain::{JourneyOption, Leg, LegKind};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

static OPTIONS_TABLE: LazyLock<Selector> =
    LazyLock::new(|| selector("table#jrne-opt-tbl, table.jrne-opt-tbl"));
static ANY_TABLE: LazyLock<Selector> = LazyLock::new(|| selector("table"));
static CAPTION: LazyLock<Selector> = LazyLock::new(|| selector("caption"));
static TBODY_ROW: LazyLock<Selector> = LazyLock::new(|| selector("tbody > tr"));
static LEAVE: LazyLock<Selector> = LazyLock::new(|| selector("td.itemLeave"));
static ARRIVE: LazyLock<Selector> = LazyLock::new(|| selector("td.itemArrive"));
static DURATION: LazyLock<Selector> = LazyLock::new(|| selector("td.itemTime"));
static ROUTE_LEGS: LazyLock<Selector> = LazyLock::new(|| selector("td.itemRoute ol > li"));
static ICON: LazyLock<Selector> = LazyLock::new(|| selector("i"));
static SPAN: LazyLock<Selector> = LazyLock::new(|| selector("span"));
static SERVICE_CODE: LazyLock<Selector> = LazyLock::new(|| selector("div.tp-service-code"));
static MESSAGE_BLOCKS: LazyLock<Selector> = LazyLock::new(|| selector("div[class], p[class]"));

static CLOCK_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}:\d{2}(?:am|pm))").expect("valid regex"));
static MESSAGE_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)error|alert|warning").expect("valid regex"));

/// Icon class fragments and the leg kind each denotes.
const ICON_KINDS: [(&str, LegKind); 5] = [
    ("icon-walk", LegKind::Walk),
    ("icon-bus-circ", LegKind::Bus),
    ("icon-train-circ", LegKind::Train),
    ("icon-ferry", LegKind::Ferry),
    ("icon-cat", LegKind::Cat),
];

/// Parse journey options from a results page.
///
/// Returns an empty list when no options table is present; any error or
/// warning blocks on the page are logged to help diagnose why.
pub fn parse_results_page(html: &str) -> Vec<JourneyOption> {
    let document = Html::parse_document(html);

    let Some(table) = find_options_table(&document) else {
        warn!("journey options table not found");
        for message in page_messages(&document) {
            warn!(%message, "possible planner message");
        }
        return Vec::new();
    };

    let options: Vec<JourneyOption> = table
        .select(&TBODY_ROW)
        .filter(|row| is_direct_row(row, &table))
        .enumerate()
        .map(|(i, row)| parse_row(row, i + 1))
        .collect();

    if options.is_empty() {
        warn!("journey options table has no rows");
    }
    debug!(count = options.len(), "parsed results page");
    options
}

/// Locate the options table by id, by class, then by caption text.
fn find_options_table(document: &Html) -> Option<ElementRef<'_>> {
    document.select(&OPTIONS_TABLE).next().or_else(|| {
        document.select(&ANY_TABLE).find(|table| {
            table
                .select(&CAPTION)
                .next()
                .is_some_and(|caption| text_of(caption).contains("Journey Options"))
        })
    })
}

/// Rows of nested tables inside a cell must not count as options.
fn is_direct_row(row: &ElementRef<'_>, table: &ElementRef<'_>) -> bool {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
        .is_some_and(|owner| owner == *table)
}

fn parse_row(row: ElementRef<'_>, index: usize) -> JourneyOption {
    let leave_time = first_text(&row, &LEAVE)
        .map(|text| {
            CLOCK_TIME
                .captures(&text)
                .map(|caps| caps[1].to_string())
                .unwrap_or(text)
        })
        .unwrap_or_default();

    let legs = row
        .select(&ROUTE_LEGS)
        .filter(|li| {
            // Only the top-level list items of the route cell
            li.parent()
                .and_then(ElementRef::wrap)
                .and_then(|ol| ol.parent())
                .and_then(ElementRef::wrap)
                .is_some_and(|cell| {
                    cell.value()
                        .classes()
                        .any(|class| class.eq_ignore_ascii_case("itemRoute"))
                })
        })
        .map(parse_leg)
        .collect();

    JourneyOption {
        index,
        leave_time,
        arrive_time: first_text(&row, &ARRIVE).unwrap_or_default(),
        travel_time: first_text(&row, &DURATION).unwrap_or_default(),
        legs,
    }
}

fn parse_leg(item: ElementRef<'_>) -> Leg {
    let kind = item
        .select(&ICON)
        .next()
        .map(|icon| icon_kind(icon.value().classes()))
        .unwrap_or_default();

    Leg::new(
        kind,
        first_text(&item, &SPAN).unwrap_or_default(),
        first_text(&item, &SERVICE_CODE),
    )
}

/// Map icon classes to a leg kind; unknown icons are walks.
fn icon_kind<'a>(classes: impl Iterator<Item = &'a str>) -> LegKind {
    let classes: Vec<&str> = classes.collect();
    ICON_KINDS
        .iter()
        .find(|(fragment, _)| classes.iter().any(|class| class.contains(fragment)))
        .map(|(_, kind)| *kind)
        .unwrap_or_default()
}

fn page_messages(document: &Html) -> Vec<String> {
    document
        .select(&MESSAGE_BLOCKS)
        .filter(|el| el.value().classes().any(|class| MESSAGE_CLASS.is_match(class)))
        .map(text_of)
        .filter(|text| !text.is_empty())
        .collect()
}

fn first_text(scope: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).next().map(text_of)
}

/// Element text with whitespace runs collapsed.
fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = include_str!("../../data/fixtures/results_page.html");

    #[test]
    fn parses_fixture_page() {
        let options = parse_results_page(RESULTS_PAGE);
        assert_eq!(options.len(), 3);

        let first = &options[0];
        assert_eq!(first.index, 1);
        assert_eq!(first.leave_time, "7:42am");
        assert_eq!(first.arrive_time, "8:51am");
        assert_eq!(first.travel_time, "69 mins");

        let kinds: Vec<_> = first.legs.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![LegKind::Walk, LegKind::Train, LegKind::Bus, LegKind::Walk]
        );
        assert_eq!(first.legs[0].description, "Walk 501m");
        assert_eq!(first.legs[0].service_code, None);
        assert_eq!(first.legs[1].service_code.as_deref(), Some("MAN"));
        assert_eq!(first.legs[2].service_code.as_deref(), Some("276"));

        let second = &options[1];
        assert_eq!(second.index, 2);
        assert_eq!(second.legs.len(), 3);
        assert_eq!(second.legs[1].kind, LegKind::Ferry);

        let third = &options[2];
        assert_eq!(third.legs[0].kind, LegKind::Cat);
        assert_eq!(third.legs[0].service_code.as_deref(), Some("Red"));
    }

    #[test]
    fn leave_time_without_clock_pattern_keeps_text() {
        let html = r#"
            <table id="jrne-opt-tbl"><tbody>
              <tr><td class="itemLeave">Now</td><td class="itemArrive">9:00am</td>
                  <td class="itemTime">5 mins</td><td class="itemRoute"><ol></ol></td></tr>
            </tbody></table>
        "#;
        let options = parse_results_page(html);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].leave_time, "Now");
        assert!(options[0].legs.is_empty());
    }

    #[test]
    fn finds_table_by_caption() {
        let html = r#"
            <table><caption>Journey Options</caption><tbody>
              <tr><td class="itemLeave">Leave 10:05pm</td><td class="itemArrive">10:40pm</td>
                  <td class="itemTime">35 mins</td>
                  <td class="itemRoute"><ol><li><i class="icon icon-bus-circ"></i><span>Bus 99</span>
                      <div class="tp-service-code">99</div></li></ol></td></tr>
            </tbody></table>
        "#;
        let options = parse_results_page(html);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].leave_time, "10:05pm");
        assert_eq!(options[0].legs[0].kind, LegKind::Bus);
        assert_eq!(options[0].legs[0].description, "Bus 99");
    }

    #[test]
    fn missing_table_yields_no_options() {
        let html = r#"<div class="alert alert-danger">No journeys found</div>"#;
        assert!(parse_results_page(html).is_empty());
        assert!(parse_results_page("").is_empty());
    }

    #[test]
    fn unknown_icon_is_walk() {
        assert_eq!(icon_kind(["icon", "icon-tram"].into_iter()), LegKind::Walk);
        assert_eq!(icon_kind(["icon-ferry-circ"].into_iter()), LegKind::Ferry);
    }
}
