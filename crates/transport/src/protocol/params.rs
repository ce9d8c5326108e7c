//! Case-insensitive multimap for decoded query fields, form fields and cookies.

/// Ordered name/value pairs looked up without regard to ASCII case.
///
/// A name may appear more than once; [`ParamMap::get`] returns the first value and
/// [`ParamMap::get_all`] every value in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamMap {
    entries: Vec<(String, String)>,
}

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        self.entries.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries.iter().filter(move |(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for ParamMap {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        Self { entries: iter.into_iter().map(|(n, v)| (n.into(), v.into())).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        let mut params = ParamMap::new();
        params.insert("PromoCode", "BOB");
        assert_eq!(params.get("promocode"), Some("BOB"));
        assert_eq!(params.get("PROMOCODE"), Some("BOB"));
        assert_eq!(params.get("other"), None);
    }

    #[test]
    fn keeps_every_value() {
        let params: ParamMap = [("a", "1"), ("b", "2"), ("A", "3")].into_iter().collect();
        assert_eq!(params.len(), 3);
        assert_eq!(params.get("a"), Some("1"));
        assert_eq!(params.get_all("a").collect::<Vec<_>>(), vec!["1", "3"]);

        let mut params = params;
        params.remove("a");
        assert_eq!(params.len(), 1);
        assert!(!params.contains("A"));
    }
}
