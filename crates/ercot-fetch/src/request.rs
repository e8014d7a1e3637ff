//! Immutable paged report requests.

/// A report endpoint plus its query parameters.
///
/// Parameters keep the order they were given in. Parameters whose value is
/// absent are omitted from the query entirely rather than sent empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    base_url: String,
    params: Vec<(String, String)>,
    page: Option<u32>,
}

impl PageRequest {
    /// Builds a request from `(name, value)` pairs, dropping absent values.
    ///
    /// # Example
    ///
    /// ```
    /// use ercot_fetch::PageRequest;
    ///
    /// let request = PageRequest::new(
    ///     "https://api.ercot.com/api/public-reports/np4-183-cd/dam_hourly_lmp",
    ///     [("deliveryDateFrom", Some("2024-01-01")), ("busName", None)],
    /// );
    /// assert_eq!(request.query(), [("deliveryDateFrom".to_string(), "2024-01-01".to_string())]);
    /// ```
    #[must_use]
    pub fn new<K, V>(
        base_url: impl Into<String>,
        params: impl IntoIterator<Item = (K, Option<V>)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let params = params
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name.into(), v.into())))
            .collect();
        Self {
            base_url: base_url.into(),
            params,
            page: None,
        }
    }

    /// Returns a copy of this request targeting a specific page.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: Some(page),
            ..self.clone()
        }
    }

    /// Returns a copy of this request without a page number.
    #[must_use]
    pub fn unpaged(&self) -> Self {
        Self {
            page: None,
            ..self.clone()
        }
    }

    /// Returns the endpoint URL without query.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the explicit page number, if any.
    #[must_use]
    pub const fn page(&self) -> Option<u32> {
        self.page
    }

    /// Returns the full query, including `page` when set.
    #[must_use]
    pub fn query(&self) -> Vec<(String, String)> {
        let mut query = self.params.clone();
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        query
    }

    /// Renders the request as a URL string, for logs and error messages.
    #[must_use]
    pub fn url(&self) -> String {
        let query = self.query();
        if query.is_empty() {
            return self.base_url.clone();
        }
        let rendered: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
        format!("{}?{}", self.base_url, rendered.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://api.ercot.com/api/public-reports/np4-183-cd/dam_hourly_lmp";

    #[test]
    fn test_absent_values_are_omitted() {
        let request = PageRequest::new(
            URL,
            [
                ("deliveryDateFrom", Some("2024-01-01")),
                ("deliveryDateTo", Some("2024-01-02")),
                ("busName", None),
                ("size", Some("200000")),
            ],
        );
        let names: Vec<String> = request.query().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["deliveryDateFrom", "deliveryDateTo", "size"]);
    }

    #[test]
    fn test_with_page_appends_page() {
        let request = PageRequest::new(URL, [("size", Some("10"))]).with_page(3);
        assert_eq!(request.page(), Some(3));
        assert_eq!(request.url(), format!("{URL}?size=10&page=3"));
        assert_eq!(request.unpaged().url(), format!("{URL}?size=10"));
    }

    #[test]
    fn test_url_without_params() {
        let request = PageRequest::new(URL, std::iter::empty::<(&str, Option<&str>)>());
        assert_eq!(request.url(), URL);
    }
}
