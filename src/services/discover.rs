// src/services/discover.rs

//! Fixture discovery.
//!
//! Enumerates the fixture links of a season listing page together with the
//! round each one belongs to.

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::FixtureLocator;
use crate::utils::parse_digits;

const CONTAINER: &str = "div.gml";
const FIXTURE_LINK: &str = "a.gma";
const ROUND_HEADING_CLASS: &str = "standing-games-date";

/// Parse a listing document into fixture locators, in document order.
///
/// A listing without any fixture container is an error: the page layout
/// changed or the season URL is wrong.
pub fn discover(html: &str) -> Result<Vec<FixtureLocator>> {
    let document = Html::parse_document(html);
    let container_sel = parse_selector(CONTAINER)?;
    let link_sel = parse_selector(FIXTURE_LINK)?;

    let containers: Vec<_> = document.select(&container_sel).collect();
    if containers.is_empty() {
        return Err(AppError::discovery("listing has no fixture containers"));
    }

    let mut locators = Vec::new();
    for container in containers {
        let Some(round) = round_of(container) else {
            log::warn!("Skipping fixture container without a round heading");
            continue;
        };

        locators.extend(
            container
                .select(&link_sel)
                .filter_map(|a| a.value().attr("href"))
                .map(str::trim)
                .filter(|href| !href.is_empty())
                .map(|href| FixtureLocator {
                    url_fragment: href.to_string(),
                    round,
                }),
        );
    }

    log::debug!("Discovered {} fixtures", locators.len());
    Ok(locators)
}

/// Round number from the nearest preceding `h2.standing-games-date` id
/// (`r12` -> 12).
fn round_of(container: ElementRef<'_>) -> Option<u32> {
    container
        .prev_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| {
            el.value().name() == "h2" && el.value().classes().any(|c| c == ROUND_HEADING_CLASS)
        })
        .and_then(|heading| heading.value().id())
        .and_then(parse_digits)
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body><div class="standings">
            <h2 class="standing-games-date" id="r1">Round 1</h2>
            <div class="gml">
                <a class="gma" href="/game/arsenal-forest/1">Arsenal - Forest</a>
                <a class="gma" href="/game/chelsea-everton/2">Chelsea - Everton</a>
            </div>
            <h2 class="standing-games-date" id="r2">Round 2</h2>
            <p>note</p>
            <div class="gml">
                <a class="gma">no link</a>
                <a class="gma" href="/game/everton-arsenal/3">Everton - Arsenal</a>
            </div>
        </div></body></html>
    "#;

    #[test]
    fn test_discover_groups_by_round() {
        let locators = discover(LISTING).unwrap();
        assert_eq!(
            locators,
            vec![
                FixtureLocator {
                    url_fragment: "/game/arsenal-forest/1".into(),
                    round: 1
                },
                FixtureLocator {
                    url_fragment: "/game/chelsea-everton/2".into(),
                    round: 1
                },
                FixtureLocator {
                    url_fragment: "/game/everton-arsenal/3".into(),
                    round: 2
                },
            ]
        );
    }

    #[test]
    fn test_container_without_heading_is_skipped() {
        let html = r#"<div>
            <div class="gml"><a class="gma" href="/game/x/1">x</a></div>
            <h2 class="standing-games-date" id="r7">Round 7</h2>
            <div class="gml"><a class="gma" href="/game/y/2">y</a></div>
        </div>"#;
        let locators = discover(html).unwrap();
        assert_eq!(locators.len(), 1);
        assert_eq!(locators[0].round, 7);
    }

    #[test]
    fn test_heading_without_digits_is_skipped() {
        let html = r#"<div>
            <h2 class="standing-games-date" id="playoffs">Playoffs</h2>
            <div class="gml"><a class="gma" href="/game/x/1">x</a></div>
        </div>"#;
        assert!(discover(html).unwrap().is_empty());
    }

    #[test]
    fn test_blank_href_is_dropped() {
        let html = r#"<div>
            <h2 class="standing-games-date" id="r3">Round 3</h2>
            <div class="gml">
                <a class="gma" href="">empty</a>
                <a class="gma" href="   ">blank</a>
                <a class="gma" href=" /game/z/9 ">z</a>
            </div>
        </div>"#;
        let locators = discover(html).unwrap();
        assert_eq!(locators.len(), 1);
        assert_eq!(locators[0].url_fragment, "/game/z/9");
    }

    #[test]
    fn test_listing_without_containers_fails() {
        let err = discover("<html><body><p>Not found</p></body></html>").unwrap_err();
        assert!(matches!(err, AppError::Discovery(_)));
    }

    #[test]
    fn test_parse_selector_invalid() {
        assert!(parse_selector("[[invalid").is_err());
    }
}
