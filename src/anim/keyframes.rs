//! Keyframe descriptions
//!
//! Three shapes are accepted: a list of keyframes, a property-indexed set of
//! value arrays, or a function producing either per element index.

use std::fmt;
use std::rc::Rc;

use super::options::Easing;

/// Animatable properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    Transform,
    Opacity,
}

impl Property {
    pub const ALL: [Property; 2] = [Property::Transform, Property::Opacity];

    pub fn css_name(&self) -> &'static str {
        match self {
            Property::Transform => "transform",
            Property::Opacity => "opacity",
        }
    }
}

/// A single property value; text values may carry placeholders
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
}

impl Value {
    pub fn to_css(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

/// One step of a keyframe list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Keyframe {
    pub transform: Option<Value>,
    pub opacity: Option<Value>,
    /// Position in [0, 1]; spaced evenly when unset
    pub offset: Option<f64>,
    pub easing: Option<Easing>,
}

impl Keyframe {
    pub fn transform(value: impl Into<String>) -> Self {
        Self {
            transform: Some(Value::Text(value.into())),
            ..Default::default()
        }
    }

    pub fn opacity(value: f64) -> Self {
        Self {
            opacity: Some(Value::Number(value)),
            ..Default::default()
        }
    }

    pub fn with_opacity(mut self, value: f64) -> Self {
        self.opacity = Some(Value::Number(value));
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn get(&self, property: Property) -> Option<&Value> {
        match property {
            Property::Transform => self.transform.as_ref(),
            Property::Opacity => self.opacity.as_ref(),
        }
    }

    pub fn set(&mut self, property: Property, value: Option<Value>) {
        match property {
            Property::Transform => self.transform = value,
            Property::Opacity => self.opacity = value,
        }
    }
}

/// Separate value arrays per property
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyKeyframes {
    pub transform: Vec<Value>,
    pub opacity: Vec<Value>,
}

impl PropertyKeyframes {
    pub fn get(&self, property: Property) -> &[Value] {
        match property {
            Property::Transform => &self.transform,
            Property::Opacity => &self.opacity,
        }
    }

    pub fn get_mut(&mut self, property: Property) -> &mut Vec<Value> {
        match property {
            Property::Transform => &mut self.transform,
            Property::Opacity => &mut self.opacity,
        }
    }
}

/// Keyframes as handed to the scheduler
#[derive(Clone)]
pub enum Keyframes {
    List(Vec<Keyframe>),
    Indexed(PropertyKeyframes),
    /// Computed from the element's position in the batch
    PerElement(Rc<dyn Fn(usize) -> Keyframes>),
}

impl Keyframes {
    pub fn per_element(f: impl Fn(usize) -> Keyframes + 'static) -> Self {
        Keyframes::PerElement(Rc::new(f))
    }

    /// Convenience for a transform-only keyframe list
    pub fn transforms<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Keyframes::List(values.into_iter().map(Keyframe::transform).collect())
    }

    /// Keyframes for the element at `index`, with per-element functions applied
    pub fn for_element(&self, index: usize) -> ResolvedKeyframes {
        match self {
            Keyframes::List(list) => ResolvedKeyframes::List(list.clone()),
            Keyframes::Indexed(indexed) => ResolvedKeyframes::Indexed(indexed.clone()),
            Keyframes::PerElement(f) => f(index).for_element(index),
        }
    }
}

impl fmt::Debug for Keyframes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keyframes::List(list) => f.debug_tuple("List").field(list).finish(),
            Keyframes::Indexed(indexed) => f.debug_tuple("Indexed").field(indexed).finish(),
            Keyframes::PerElement(_) => f.write_str("PerElement(..)"),
        }
    }
}

impl From<Vec<Keyframe>> for Keyframes {
    fn from(list: Vec<Keyframe>) -> Self {
        Keyframes::List(list)
    }
}

impl From<Keyframe> for Keyframes {
    fn from(keyframe: Keyframe) -> Self {
        Keyframes::List(vec![keyframe])
    }
}

impl From<PropertyKeyframes> for Keyframes {
    fn from(indexed: PropertyKeyframes) -> Self {
        Keyframes::Indexed(indexed)
    }
}

/// Keyframes for one concrete element
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedKeyframes {
    List(Vec<Keyframe>),
    Indexed(PropertyKeyframes),
}

impl ResolvedKeyframes {
    /// Number of steps for `property`
    pub fn steps(&self, property: Property) -> usize {
        match self {
            ResolvedKeyframes::List(list) => {
                list.iter().filter(|k| k.get(property).is_some()).count()
            }
            ResolvedKeyframes::Indexed(indexed) => indexed.get(property).len(),
        }
    }

    /// Longest step count over all properties
    pub fn step_count(&self) -> usize {
        match self {
            ResolvedKeyframes::List(list) => list.len(),
            ResolvedKeyframes::Indexed(indexed) => Property::ALL
                .iter()
                .map(|p| indexed.get(*p).len())
                .max()
                .unwrap_or(0),
        }
    }

    /// Properties this animation touches
    pub fn properties(&self) -> Vec<Property> {
        Property::ALL
            .into_iter()
            .filter(|p| self.steps(*p) > 0)
            .collect()
    }

    /// Values of `property` in step order
    pub fn values(&self, property: Property) -> Vec<String> {
        match self {
            ResolvedKeyframes::List(list) => list
                .iter()
                .filter_map(|k| k.get(property).map(Value::to_css))
                .collect(),
            ResolvedKeyframes::Indexed(indexed) => {
                indexed.get(property).iter().map(Value::to_css).collect()
            }
        }
    }

    pub fn first_value(&self, property: Property) -> Option<String> {
        self.values(property).into_iter().next()
    }

    pub fn last_value(&self, property: Property) -> Option<String> {
        self.values(property).pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_element_keyframes() {
        let keyframes = Keyframes::per_element(|i| {
            Keyframes::transforms([format!("translateX({}px)", i * 10)])
        });
        assert_eq!(
            keyframes.for_element(3).first_value(Property::Transform),
            Some("translateX(30px)".to_string())
        );
    }

    #[test]
    fn test_step_counts() {
        let list = ResolvedKeyframes::List(vec![
            Keyframe::transform("a"),
            Keyframe::transform("b").with_opacity(1.0),
            Keyframe::opacity(0.0),
        ]);
        assert_eq!(list.step_count(), 3);
        assert_eq!(list.steps(Property::Transform), 2);
        assert_eq!(list.values(Property::Opacity), vec!["1", "0"]);

        let indexed = ResolvedKeyframes::Indexed(PropertyKeyframes {
            transform: vec!["a".into()],
            opacity: vec![0.0.into(), 0.5.into()],
        });
        assert_eq!(indexed.step_count(), 2);
        assert_eq!(indexed.properties(), vec![Property::Transform, Property::Opacity]);
        assert_eq!(indexed.last_value(Property::Opacity), Some("0.5".to_string()));
    }
}
