use url::Url;

/// Returns the category URL with a trailing slash
///
/// Joining `"{page}/"` onto a base without the trailing slash would replace the
/// last path segment instead of descending into it.
pub fn category_base(category_url: &Url) -> Url {
    let mut base = category_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.set_query(None);
    base.set_fragment(None);
    base
}

/// Builds the URL of listing page `page` under `category_url`
///
/// # Examples
///
/// ```
/// use url::Url;
/// use tome_harvest::url::listing_page_url;
///
/// let category = Url::parse("https://tululu.org/l55").unwrap();
/// let page = listing_page_url(&category, 3).unwrap();
/// assert_eq!(page.as_str(), "https://tululu.org/l55/3/");
/// ```
pub fn listing_page_url(category_url: &Url, page: u32) -> Result<Url, url::ParseError> {
    category_base(category_url).join(&format!("{}/", page))
}
