/*
[INPUT]:  Raw response header block in wire order
[OUTPUT]: HeaderMap with repeated names accumulated into lists
[POS]:    HTTP layer - response header parsing
[UPDATE]: When changing header folding or lookup rules
*/

/// A parsed header value: one occurrence or several, in wire order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Single(String),
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// First value seen on the wire
    pub fn first(&self) -> &str {
        match self {
            HeaderValue::Single(value) => value,
            HeaderValue::Multiple(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            HeaderValue::Single(value) => vec![value.as_str()],
            HeaderValue::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            HeaderValue::Single(existing) => {
                let first = std::mem::take(existing);
                *self = HeaderValue::Multiple(vec![first, value]);
            }
            HeaderValue::Multiple(values) => values.push(value),
        }
    }

    fn fold(&mut self, continuation: &str) {
        let target = match self {
            HeaderValue::Single(value) => value,
            HeaderValue::Multiple(values) => match values.last_mut() {
                Some(value) => value,
                None => return,
            },
        };
        target.push_str("\r\n\t");
        target.push_str(continuation);
    }
}

/// Response headers keyed by the name exactly as sent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    status_line: Option<String>,
    entries: Vec<(String, HeaderValue)>,
}

impl HeaderMap {
    /// Parse a raw header block (lines separated by `\n`).
    pub fn parse(raw: &str) -> Self {
        let mut map = HeaderMap::default();
        let mut last: Option<usize> = None;

        for line in raw.split('\n') {
            match line.split_once(':') {
                Some((name, value)) => {
                    let value = value.trim().to_string();
                    let index = match map.position(name) {
                        Some(index) => {
                            map.entries[index].1.push(value);
                            index
                        }
                        None => {
                            map.entries.push((name.to_string(), HeaderValue::Single(value)));
                            map.entries.len() - 1
                        }
                    };
                    last = Some(index);
                }
                None if line.starts_with('\t') => {
                    if let Some(index) = last {
                        map.entries[index].1.fold(line.trim());
                    }
                }
                None if last.is_none() => {
                    let line = line.trim();
                    if !line.is_empty() {
                        map.status_line = Some(line.to_string());
                    }
                }
                None => {}
            }
        }

        map
    }

    /// Look up a header, exact name first then ASCII case-insensitive
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.position(name)
            .or_else(|| {
                self.entries
                    .iter()
                    .position(|(key, _)| key.eq_ignore_ascii_case(name))
            })
            .map(|index| &self.entries[index].1)
    }

    /// Leading non-header line, normally the HTTP status line. Diagnostic only.
    pub fn status_line(&self) -> Option<&str> {
        self.status_line.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key == name)
    }
}
