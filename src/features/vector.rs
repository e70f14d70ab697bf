/// Named feature values for one forecast step, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Pairs names with values; both must have the same length.
    pub fn new(names: Vec<String>, values: Vec<f64>) -> Option<Self> {
        (names.len() == values.len()).then_some(Self { names, values })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of the named feature.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

impl FromIterator<(String, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let (names, values) = iter.into_iter().unzip();
        Self { names, values }
    }
}

#[cfg(test)]
mod tests {
    use super::FeatureVector;

    #[test]
    fn rejects_mismatched_lengths() {
        assert!(FeatureVector::new(vec!["a".into()], vec![]).is_none());
    }

    #[test]
    fn looks_up_by_name() {
        let fv = FeatureVector::new(vec!["a".into(), "b".into()], vec![1.0, 2.0])
            .expect("lengths match");
        assert_eq!(fv.get("b"), Some(2.0));
        assert_eq!(fv.get("c"), None);
        assert_eq!(fv.iter().count(), 2);
    }

    #[test]
    fn collects_from_named_pairs() {
        let fv: FeatureVector = [("a".to_string(), 1.0), ("b".to_string(), 2.0)]
            .into_iter()
            .collect();
        assert_eq!(fv.names(), ["a", "b"]);
        assert_eq!(fv.values(), &[1.0, 2.0]);
    }
}
