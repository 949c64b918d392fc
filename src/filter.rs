//! Resource filtering. Everything here is pure and cheap enough to run on
//! every keystroke.

use crate::models::Resource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterFlags {
    pub case_sensitive: bool,
    pub inverse: bool,
    /// Enables `column=value` terms.
    pub advanced: bool,
    /// Accepted for compatibility; matching is still plain substring.
    pub regex: bool,
}

/// A compiled filter for one resource kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub text: String,
    /// Column filters by column index; empty entries are ignored.
    pub columns: Vec<String>,
    pub flags: FilterFlags,
}

impl Filter {
    #[cfg(test)]
    pub fn simple(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Compiles user input against a kind's headers. In advanced mode each
    /// `column=value` term, where the column is a header name or a 1-based
    /// index, becomes a column filter. Everything else is matched against the
    /// resource name.
    pub fn parse(input: &str, flags: FilterFlags, headers: &[&str]) -> Self {
        if !flags.advanced {
            return Self {
                text: input.trim().to_string(),
                columns: Vec::new(),
                flags,
            };
        }

        let mut text = Vec::new();
        let mut columns = vec![String::new(); headers.len()];
        for term in input.split_whitespace() {
            let column = term
                .split_once('=')
                .and_then(|(col, value)| Some((column_index(col, headers)?, value)));
            match column {
                Some((idx, value)) => columns[idx] = value.to_string(),
                None => text.push(term),
            }
        }
        if columns.iter().all(String::is_empty) {
            columns.clear();
        }

        Self {
            text: text.join(" "),
            columns,
            flags,
        }
    }

    /// An inactive filter passes everything, inverse or not.
    pub fn is_active(&self) -> bool {
        !self.text.is_empty() || self.columns.iter().any(|c| !c.is_empty())
    }

    pub fn matches(&self, resource: &Resource) -> bool {
        if !self.is_active() {
            return true;
        }
        let name = resource.name();
        if name.is_empty() {
            return false;
        }

        let mut matched = self.text.is_empty() || self.contains(name, &self.text);
        if matched && self.flags.advanced && self.columns.iter().any(|c| !c.is_empty()) {
            let values = resource.columns();
            matched = self
                .columns
                .iter()
                .enumerate()
                .filter(|(_, needle)| !needle.is_empty())
                .all(|(idx, needle)| {
                    values
                        .get(idx)
                        .is_some_and(|value| self.contains(value, needle))
                });
        }

        matched != self.flags.inverse
    }

    fn contains(&self, haystack: &str, needle: &str) -> bool {
        if self.flags.case_sensitive {
            haystack.contains(needle)
        } else {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }
    }
}

fn column_index(column: &str, headers: &[&str]) -> Option<usize> {
    if column.is_empty() {
        return None;
    }
    if let Ok(n) = column.parse::<usize>() {
        return (1..=headers.len()).contains(&n).then(|| n - 1);
    }
    headers.iter().position(|h| h.eq_ignore_ascii_case(column))
}

/// The ordered subsequence of `items` that passes `filter`.
pub fn filtered_view(items: &[Resource], filter: &Filter) -> Vec<Resource> {
    if !filter.is_active() {
        return items.to_vec();
    }
    items.iter().filter(|r| filter.matches(r)).cloned().collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use crate::models::ResourceKind;
    use crate::models::fixtures::{pod, pod_with_phase, pods};

    fn names(items: &[Resource]) -> Vec<&str> {
        items.iter().map(Resource::name).collect()
    }

    #[test]
    fn nginx_filter_keeps_only_nginx() {
        let items = pods(&["nginx-pod", "redis-pod"]);
        let view = filtered_view(&items, &Filter::simple("nginx"));
        assert_eq!(names(&view), vec!["nginx-pod"]);
    }

    #[test]
    fn empty_filter_passes_everything_in_order() {
        let items = pods(&["b", "a", "c"]);
        let view = filtered_view(&items, &Filter::default());
        assert_eq!(names(&view), vec!["b", "a", "c"]);

        let inverse = Filter {
            flags: FilterFlags {
                inverse: true,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(filtered_view(&items, &inverse).len(), 3);
    }

    #[test]
    fn case_folding_is_default() {
        let items = pods(&["NGINX-1", "redis"]);
        assert_eq!(filtered_view(&items, &Filter::simple("nginx")).len(), 1);

        let strict = Filter {
            text: "nginx".into(),
            flags: FilterFlags {
                case_sensitive: true,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(filtered_view(&items, &strict).is_empty());
    }

    #[test]
    fn inverse_negates_match() {
        let items = pods(&["nginx-pod", "redis-pod", "nginx-2"]);
        let filter = Filter {
            text: "nginx".into(),
            flags: FilterFlags {
                inverse: true,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(names(&filtered_view(&items, &filter)), vec!["redis-pod"]);
    }

    #[test]
    fn unnamed_resources_never_match() {
        let items = vec![pod(""), pod("web")];
        let filter = Filter {
            text: "x".into(),
            flags: FilterFlags {
                inverse: true,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(names(&filtered_view(&items, &filter)), vec!["web"]);
    }

    proptest! {
        #[test]
        fn filtering_is_idempotent(
            items in strategies::pods(),
            input in strategies::filter_input(),
            flags in strategies::flags()
        ) {
            let f = Filter::parse(&input, flags, ResourceKind::Pod.headers());
            let once = filtered_view(&items, &f);
            let twice = filtered_view(&once, &f);
            prop_assert_eq!(names(&once), names(&twice));
        }

        #[test]
        fn filtered_view_keeps_relative_order(
            items in strategies::pods(),
            input in strategies::filter_input(),
            flags in strategies::flags()
        ) {
            let f = Filter::parse(&input, flags, ResourceKind::Pod.headers());
            let once = filtered_view(&items, &f);
            let mut rest = items.iter();
            prop_assert!(once.iter().all(|kept| rest.any(|r| r.name() == kept.name())));
        }
    }

    #[test]
    fn regex_flag_matches_like_substring() {
        let items = pods(&["web-1", "web.2"]);
        let filter = Filter {
            text: "web.".into(),
            flags: FilterFlags {
                regex: true,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(names(&filtered_view(&items, &filter)), vec!["web.2"]);
    }

    #[test]
    fn parse_simple_keeps_whole_input() {
        let f = Filter::parse(" status=Running ", FilterFlags::default(), ResourceKind::Pod.headers());
        assert_eq!(f.text, "status=Running");
        assert!(f.columns.is_empty());
    }

    #[test]
    fn parse_advanced_extracts_columns() {
        let flags = FilterFlags {
            advanced: true,
            ..Default::default()
        };
        let headers = ResourceKind::Pod.headers();
        let f = Filter::parse("web status=Running 6=node-1 bogus=1", flags, headers);
        assert_eq!(f.text, "web bogus=1");
        assert_eq!(f.columns[1], "Running");
        assert_eq!(f.columns[5], "node-1");
        assert_eq!(f.columns.len(), headers.len());
    }

    #[test]
    fn advanced_column_filters_must_all_match() {
        let items = vec![
            pod_with_phase("web-1", "Running"),
            pod_with_phase("web-2", "Pending"),
            pod_with_phase("db-1", "Running"),
        ];
        let flags = FilterFlags {
            advanced: true,
            ..Default::default()
        };
        let f = Filter::parse("web status=run", flags, ResourceKind::Pod.headers());
        assert_eq!(names(&filtered_view(&items, &f)), vec!["web-1"]);

        let only_column = Filter::parse("status=pending", flags, ResourceKind::Pod.headers());
        assert_eq!(names(&filtered_view(&items, &only_column)), vec!["web-2"]);
    }

    #[test]
    fn column_index_bounds() {
        let headers = ["Name", "Data", "Age"];
        assert_eq!(column_index("1", &headers), Some(0));
        assert_eq!(column_index("3", &headers), Some(2));
        assert_eq!(column_index("0", &headers), None);
        assert_eq!(column_index("4", &headers), None);
        assert_eq!(column_index("data", &headers), Some(1));
    }
}
