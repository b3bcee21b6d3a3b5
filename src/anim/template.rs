//! Placeholder substitution in keyframe values
//!
//! - `%s`: the element's current computed value of the property
//! - `%i`: the element's index in the batch
//! - `%kN`: the already-resolved value of keyframe N (only if N is earlier)
//! - `%kN^`: the resolved value N keyframes back from the current one
//!
//! Placeholders that don't resolve become empty; the result is trimmed.

use super::keyframes::{Property, ResolvedKeyframes, Value};
use super::target::AnimationTarget;

/// Substitute placeholders in a single value
///
/// `position` is the index of the keyframe being resolved; `earlier` looks up
/// resolved values of keyframes before it.
pub fn format_value(
    template: &str,
    current: &str,
    index: usize,
    position: usize,
    earlier: &dyn Fn(usize) -> Option<String>,
) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('s') => {
                chars.next();
                out.push_str(current);
            }
            Some('i') => {
                chars.next();
                out.push_str(&index.to_string());
            }
            Some('k') => {
                let mut look = chars.clone();
                look.next();
                let mut digits = String::new();
                while let Some(d) = look.peek().copied().filter(char::is_ascii_digit) {
                    digits.push(d);
                    look.next();
                }
                if digits.is_empty() {
                    out.push('%');
                    continue;
                }
                let relative = look.peek() == Some(&'^');
                if relative {
                    look.next();
                }
                chars = look;

                let n: usize = digits.parse().unwrap_or(usize::MAX);
                let referenced = if relative {
                    position.checked_sub(n).filter(|_| n >= 1)
                } else {
                    Some(n).filter(|n| *n < position)
                };
                if let Some(value) = referenced.and_then(earlier) {
                    out.push_str(&value);
                }
            }
            _ => out.push('%'),
        }
    }

    out.trim().to_string()
}

/// Computed value with the CSS "no value" keyword mapped to empty
fn current_value(target: &dyn AnimationTarget, property: Property) -> String {
    match target.computed_value(property) {
        Some(v) if v.trim() != "none" => v.trim().to_string(),
        _ => String::new(),
    }
}

fn resolve_values(
    values: &[Option<Value>],
    target: &dyn AnimationTarget,
    property: Property,
    index: usize,
) -> Vec<Option<Value>> {
    let mut current: Option<String> = None;
    let mut resolved: Vec<Option<Value>> = Vec::with_capacity(values.len());

    for (position, value) in values.iter().enumerate() {
        let next = match value {
            Some(Value::Text(template)) if template.contains('%') => {
                let current = current
                    .get_or_insert_with(|| current_value(target, property))
                    .clone();
                let earlier =
                    |n: usize| resolved.get(n).and_then(|v| v.as_ref()).map(Value::to_css);
                Some(Value::Text(format_value(
                    template, &current, index, position, &earlier,
                )))
            }
            other => other.clone(),
        };
        resolved.push(next);
    }

    resolved
}

/// Resolve every placeholder in `keyframes` against `target`
pub fn resolve_keyframes(
    keyframes: ResolvedKeyframes,
    target: &dyn AnimationTarget,
    index: usize,
) -> ResolvedKeyframes {
    match keyframes {
        ResolvedKeyframes::List(mut list) => {
            for property in Property::ALL {
                let values: Vec<Option<Value>> =
                    list.iter().map(|k| k.get(property).cloned()).collect();
                let resolved = resolve_values(&values, target, property, index);
                for (keyframe, value) in list.iter_mut().zip(resolved) {
                    keyframe.set(property, value);
                }
            }
            ResolvedKeyframes::List(list)
        }
        ResolvedKeyframes::Indexed(mut indexed) => {
            for property in Property::ALL {
                let values: Vec<Option<Value>> =
                    indexed.get(property).iter().cloned().map(Some).collect();
                let resolved = resolve_values(&values, target, property, index);
                *indexed.get_mut(property) = resolved.into_iter().flatten().collect();
            }
            ResolvedKeyframes::Indexed(indexed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::keyframes::{Keyframe, PropertyKeyframes};
    use crate::sim::{SimElement, SimTimeline};

    fn no_earlier(_: usize) -> Option<String> {
        None
    }

    #[test]
    fn test_current_value() {
        assert_eq!(
            format_value("%s translateY(10px)", "rotateY(30deg)", 0, 0, &no_earlier),
            "rotateY(30deg) translateY(10px)"
        );
    }

    #[test]
    fn test_empty_current_value_is_trimmed() {
        assert_eq!(
            format_value("%s translateY(10px)", "", 0, 0, &no_earlier),
            "translateY(10px)"
        );
    }

    #[test]
    fn test_index_placeholder() {
        assert_eq!(
            format_value("translateZ(%ipx)", "", 7, 0, &no_earlier),
            "translateZ(7px)"
        );
    }

    #[test]
    fn test_keyframe_reference_must_be_earlier() {
        let earlier = |n: usize| Some(format!("k{n}"));
        assert_eq!(format_value("%k0 b", "", 0, 2, &earlier), "k0 b");
        assert_eq!(format_value("%k2 b", "", 0, 2, &earlier), "b");
        assert_eq!(format_value("%k5", "", 0, 2, &earlier), "");
    }

    #[test]
    fn test_relative_keyframe_reference() {
        let earlier = |n: usize| Some(format!("k{n}"));
        assert_eq!(format_value("%k1^ x", "", 0, 3, &earlier), "k2 x");
        assert_eq!(format_value("%k0^ x", "", 0, 3, &earlier), "x");
        assert_eq!(format_value("%k4^ x", "", 0, 3, &earlier), "x");
    }

    #[test]
    fn test_plain_percent_is_kept() {
        assert_eq!(
            format_value("translateY(50%) %k", "", 0, 1, &no_earlier),
            "translateY(50%) %k"
        );
    }

    #[test]
    fn test_resolve_list_against_element() {
        let timeline = SimTimeline::new();
        let element = SimElement::new(&timeline, "card");
        element.set_inline(Property::Transform, "rotateY(30deg)");

        let keyframes = ResolvedKeyframes::List(vec![
            Keyframe::transform("%s"),
            Keyframe::transform("%k0 translateY(10px)"),
            Keyframe::transform("%k1 scale(%i)").with_opacity(0.5),
        ]);
        let resolved = resolve_keyframes(keyframes, &element, 2);
        assert_eq!(
            resolved.values(Property::Transform),
            vec![
                "rotateY(30deg)",
                "rotateY(30deg) translateY(10px)",
                "rotateY(30deg) translateY(10px) scale(2)",
            ]
        );
        assert_eq!(resolved.values(Property::Opacity), vec!["0.5"]);
    }

    #[test]
    fn test_none_computed_value_is_empty() {
        let timeline = SimTimeline::new();
        let element = SimElement::new(&timeline, "shadow");
        element.set_inline(Property::Transform, "none");

        let keyframes = ResolvedKeyframes::Indexed(PropertyKeyframes {
            transform: vec!["translateY(55px) %s".into()],
            opacity: vec![],
        });
        let resolved = resolve_keyframes(keyframes, &element, 0);
        assert_eq!(
            resolved.first_value(Property::Transform),
            Some("translateY(55px)".to_string())
        );
    }
}
