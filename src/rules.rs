//! Style repair rules.
//!
//! Each [`StyleRule`] looks at an element's [`Declarations`] and drops or
//! simplifies properties that cannot affect rendering. Rules are independent;
//! [`repair`] runs them in [`StyleRule::DEFAULT_ORDER`], each one seeing the
//! output of the previous.

use crate::ast::Element;
use crate::style::Declarations;

/// What a rule may know about the element that owns the declarations.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext {
    /// Whether the element or any of its descendants renders text
    pub can_render_text: bool,
}

impl RuleContext {
    pub fn for_element(elem: &Element) -> Self {
        Self {
            can_render_text: elem.can_render_text(),
        }
    }
}

/// A single style repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleRule {
    /// `fill:url(#a) #000` becomes `fill:url(#a)`.
    UrlFallback,
    /// `opacity:0` makes every fill and stroke property dead.
    OpacityZero,
    /// `fill:none` / `stroke:none` makes the rest of that side dead.
    NonePaint,
    /// `fill-opacity:0` / `stroke-opacity:0` makes the rest of that side dead.
    PaintOpacityZero,
    /// `stroke-width:0` makes every other stroke property dead.
    StrokeWidthZero,
    /// Text properties on elements that never render text.
    TextStyle,
    /// Editor specific properties such as `-inkscape-font-specification`.
    VendorPrefix,
}

const PAINT_SIDES: [&str; 2] = ["fill", "stroke"];

const TEXT_PROPERTIES: &[&str] = &[
    "font",
    "letter-spacing",
    "word-spacing",
    "line-height",
    "text-anchor",
    "text-align",
    "text-decoration",
    "text-indent",
    "text-rendering",
    "text-transform",
    "writing-mode",
    "direction",
    "unicode-bidi",
    "dominant-baseline",
    "alignment-baseline",
    "baseline-shift",
    "kerning",
    "glyph-orientation-horizontal",
    "glyph-orientation-vertical",
    "block-progression",
];

impl StyleRule {
    /// The order rules run in.
    pub const DEFAULT_ORDER: [StyleRule; 7] = [
        StyleRule::UrlFallback,
        StyleRule::OpacityZero,
        StyleRule::NonePaint,
        StyleRule::PaintOpacityZero,
        StyleRule::StrokeWidthZero,
        StyleRule::TextStyle,
        StyleRule::VendorPrefix,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StyleRule::UrlFallback => "url-fallback",
            StyleRule::OpacityZero => "opacity-zero",
            StyleRule::NonePaint => "none-paint",
            StyleRule::PaintOpacityZero => "paint-opacity-zero",
            StyleRule::StrokeWidthZero => "stroke-width-zero",
            StyleRule::TextStyle => "text-style",
            StyleRule::VendorPrefix => "vendor-prefix",
        }
    }

    /// Apply this rule. Returns whether anything changed.
    pub fn apply(self, decls: &mut Declarations, cx: &RuleContext) -> bool {
        match self {
            StyleRule::UrlFallback => {
                let mut changed = false;
                for (prop, value) in decls.iter_mut() {
                    if !PAINT_SIDES.contains(&prop) {
                        continue;
                    }
                    if let Some(url) = strip_url_fallback(value) {
                        log::debug!("{}: {prop}:{value} -> {prop}:{url}", self.name());
                        *value = url;
                        changed = true;
                    }
                }
                changed
            }
            StyleRule::OpacityZero => {
                if !decls.get("opacity").is_some_and(is_zero) {
                    return false;
                }
                self.remove_where(decls, |prop| {
                    PAINT_SIDES.iter().any(|side| is_side_property(prop, side))
                })
            }
            StyleRule::NonePaint => {
                let mut changed = false;
                for side in PAINT_SIDES {
                    if decls.get(side).is_some_and(is_none_value) {
                        changed |= self.drop_dead_side(decls, side);
                    }
                }
                changed
            }
            StyleRule::PaintOpacityZero => {
                let mut changed = false;
                for side in PAINT_SIDES {
                    if decls.get(&format!("{side}-opacity")).is_some_and(is_zero) {
                        changed |= self.drop_dead_side(decls, side);
                    }
                }
                changed
            }
            StyleRule::StrokeWidthZero => {
                if !decls.get("stroke-width").is_some_and(is_zero) {
                    return false;
                }
                self.drop_dead_side(decls, "stroke")
            }
            StyleRule::TextStyle => {
                if cx.can_render_text {
                    return false;
                }
                self.remove_where(decls, is_text_property)
            }
            StyleRule::VendorPrefix => self.remove_where(decls, is_vendor_prefixed),
        }
    }

    /// Remove every property of a dead side except its survivor.
    fn drop_dead_side(self, decls: &mut Declarations, side: &str) -> bool {
        let Some(survivor) = dead_side_survivor(decls, side) else {
            return false;
        };
        self.remove_where(decls, |prop| prop != survivor && is_side_property(prop, side))
    }

    fn remove_where(self, decls: &mut Declarations, dead: impl Fn(&str) -> bool) -> bool {
        let before = decls.len();
        decls.retain(|prop, value| {
            if dead(prop) {
                log::debug!("{}: dropping {prop}:{value}", self.name());
                return false;
            }
            true
        });
        decls.len() != before
    }
}

/// The one declaration kept when a side is dead, whichever rule noticed it
/// first: `<side>:none`, then `<side>-opacity:0`, then `stroke-width:0`.
fn dead_side_survivor(decls: &Declarations, side: &str) -> Option<String> {
    if decls.get(side).is_some_and(is_none_value) {
        return Some(side.to_string());
    }
    let opacity = format!("{side}-opacity");
    if decls.get(&opacity).is_some_and(is_zero) {
        return Some(opacity);
    }
    if side == "stroke" && decls.get("stroke-width").is_some_and(is_zero) {
        return Some("stroke-width".to_string());
    }
    None
}

/// Run every rule in [`StyleRule::DEFAULT_ORDER`]. Returns whether anything changed.
pub fn repair(decls: &mut Declarations, cx: &RuleContext) -> bool {
    run_rules(&StyleRule::DEFAULT_ORDER, decls, cx)
}

/// Run the given rules in order. Returns whether anything changed.
pub fn run_rules(rules: &[StyleRule], decls: &mut Declarations, cx: &RuleContext) -> bool {
    let mut changed = false;
    for rule in rules {
        changed |= rule.apply(decls, cx);
    }
    changed
}

/// `fill` itself or any `fill-*` property (likewise for `stroke`).
fn is_side_property(prop: &str, side: &str) -> bool {
    prop.strip_prefix(side)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('-'))
}

fn is_none_value(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("none")
}

fn is_text_property(prop: &str) -> bool {
    prop.starts_with("font-") || TEXT_PROPERTIES.contains(&prop)
}

/// `-inkscape-*`, `-webkit-*` and friends. Custom properties (`--*`) are not vendor specific.
fn is_vendor_prefixed(prop: &str) -> bool {
    prop.starts_with('-') && !prop.starts_with("--")
}

/// Numeric zero, ignoring a trailing unit: `0`, `0.0`, `0%`, `0px`.
fn is_zero(value: &str) -> bool {
    let number = value
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == '%');
    number.parse::<f64>().is_ok_and(|n| n == 0.0)
}

/// `url(#a) rgb(0,0,0)` -> `url(#a)`; `None` when there is no fallback to drop.
fn strip_url_fallback(value: &str) -> Option<String> {
    let value = value.trim();
    if !value.get(..4)?.eq_ignore_ascii_case("url(") {
        return None;
    }
    let end = value.find(')')? + 1;
    let (url, fallback) = value.split_at(end);
    if fallback.trim().is_empty() {
        None
    } else {
        Some(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHAPE: RuleContext = RuleContext {
        can_render_text: false,
    };

    const TEXT: RuleContext = RuleContext {
        can_render_text: true,
    };

    fn repaired_in_reverse(style: &str) -> String {
        let mut rules = StyleRule::DEFAULT_ORDER;
        rules.reverse();
        let mut decls = Declarations::parse(style);
        run_rules(&rules, &mut decls, &SHAPE);
        decls.to_string()
    }

    fn repaired(style: &str, cx: &RuleContext) -> String {
        let mut decls = Declarations::parse(style);
        repair(&mut decls, cx);
        decls.to_string()
    }

    #[test]
    fn url_fallback_is_dropped() {
        assert_eq!(
            repaired("fill:url(#test) rgb(0,0,0); stroke:url(#test) rgb(0,0,0);", &SHAPE),
            "fill:url(#test);stroke:url(#test);"
        );
    }

    #[test]
    fn url_without_fallback_is_untouched() {
        let mut decls = Declarations::parse("fill:url(#a);color:url(#b) red");
        assert!(!StyleRule::UrlFallback.apply(&mut decls, &SHAPE));
        assert_eq!(decls.to_string(), "fill:url(#a);color:url(#b) red;");
    }

    #[test]
    fn opacity_zero_drops_all_paint() {
        assert_eq!(
            repaired(
                "opacity:0;fill:#0000ff;fill-rule:evenodd;stroke:#000000;stroke-linecap:butt;stroke-linejoin:miter;stroke-opacity:1",
                &SHAPE
            ),
            "opacity:0;"
        );
    }

    #[test]
    fn opacity_zero_keeps_unrelated_properties() {
        assert_eq!(
            repaired("display:inline;opacity:0.0;fill:red", &SHAPE),
            "display:inline;opacity:0.0;"
        );
        assert_eq!(repaired("opacity:0.5;fill:red", &SHAPE), "opacity:0.5;fill:red;");
    }

    #[test]
    fn none_paint_drops_its_side() {
        assert_eq!(
            repaired(
                "fill:none;fill-rule:evenodd;stroke:none;stroke-linecap:butt;stroke-linejoin:miter;stroke-opacity:1",
                &SHAPE
            ),
            "fill:none;stroke:none;"
        );
        assert_eq!(
            repaired("fill:none;fill-opacity:1;stroke:#000;stroke-width:2", &SHAPE),
            "fill:none;stroke:#000;stroke-width:2;"
        );
    }

    #[test]
    fn paint_opacity_zero_drops_its_side() {
        assert_eq!(
            repaired(
                "fill:#000000;fill-rule:evenodd;fill-opacity:0;stroke:#000000;stroke-linecap:butt;stroke-linejoin:miter;stroke-opacity:0",
                &SHAPE
            ),
            "fill-opacity:0;stroke-opacity:0;"
        );
    }

    #[test]
    fn zero_stroke_width_drops_stroke() {
        assert_eq!(
            repaired(
                "stroke:#000000;stroke-linecap:butt;stroke-linejoin:miter;stroke-opacity:1;stroke-width:0",
                &SHAPE
            ),
            "stroke-width:0;"
        );
        assert_eq!(
            repaired("fill:red;stroke:#000;stroke-width:0px", &SHAPE),
            "fill:red;stroke-width:0px;"
        );
    }

    #[test]
    fn stroke_prefix_does_not_match_lookalikes() {
        assert!(is_side_property("stroke-dasharray", "stroke"));
        assert!(is_side_property("fill", "fill"));
        assert!(!is_side_property("fillet", "fill"));
    }

    #[test]
    fn text_style_depends_on_context() {
        assert_eq!(repaired("font-family:Arial;font-style:bold", &SHAPE), "");
        assert_eq!(
            repaired("font-family:Arial;text-anchor:middle", &TEXT),
            "font-family:Arial;text-anchor:middle;"
        );
        assert_eq!(
            repaired("fill:red;line-height:1.25;font:12px serif", &SHAPE),
            "fill:red;"
        );
    }

    #[test]
    fn vendor_prefix_is_always_dropped() {
        assert_eq!(repaired("-inkscape-font-specification:tbd;", &TEXT), "");
        assert_eq!(repaired("-webkit-user-select:none;--brand:red", &SHAPE), "--brand:red;");
    }

    #[test]
    fn rule_order_does_not_change_the_fixed_point() {
        let style = "opacity:0;fill:none;fill-opacity:0;stroke:url(#a) red;stroke-width:0";
        assert_eq!(repaired(style, &SHAPE), "opacity:0;");
        assert_eq!(repaired_in_reverse(style), "opacity:0;");
    }

    #[test]
    fn none_paint_wins_over_zero_opacity() {
        for style in ["fill:none;fill-opacity:0", "fill-opacity:0;fill:none"] {
            assert_eq!(repaired(style, &SHAPE), "fill:none;", "{style}");
            assert_eq!(repaired_in_reverse(style), "fill:none;", "{style}");
        }
    }

    #[test]
    fn none_stroke_wins_over_zero_width() {
        for style in ["stroke:none;stroke-width:0", "stroke-width:0;stroke:none"] {
            assert_eq!(repaired(style, &SHAPE), "stroke:none;", "{style}");
            assert_eq!(repaired_in_reverse(style), "stroke:none;", "{style}");
        }
    }

    #[test]
    fn zero_stroke_opacity_wins_over_zero_width() {
        let style = "stroke:#000;stroke-width:0;stroke-opacity:0;stroke-linecap:round";
        assert_eq!(repaired(style, &SHAPE), "stroke-opacity:0;");
        assert_eq!(repaired_in_reverse(style), "stroke-opacity:0;");
    }

    #[test]
    fn repair_reports_changes() {
        let mut decls = Declarations::parse("fill:red");
        assert!(!repair(&mut decls, &SHAPE));
        let mut decls = Declarations::parse("fill:red;-inkscape-x:1");
        assert!(repair(&mut decls, &SHAPE));
    }
}
