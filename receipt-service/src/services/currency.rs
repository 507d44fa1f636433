use receipt_form::Currency;
use std::path::Path;

/// Load the selectable currencies, falling back to USD when the list is
/// missing, malformed or empty.
pub fn load_currencies(path: impl AsRef<Path>) -> Vec<Currency> {
    let path = path.as_ref();
    let loaded = std::fs::read(path)
        .map_err(anyhow::Error::from)
        .and_then(|bytes| serde_json::from_slice::<Vec<Currency>>(&bytes).map_err(Into::into));

    match loaded {
        Ok(currencies) if !currencies.is_empty() => {
            tracing::info!(count = currencies.len(), path = %path.display(), "Currencies loaded");
            currencies
        }
        Ok(_) => {
            tracing::warn!(path = %path.display(), "Currency list is empty, using USD");
            vec![Currency::default()]
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Error loading currencies, using USD");
            vec![Currency::default()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_usd() {
        let currencies = load_currencies("does/not/exist.json");
        assert_eq!(currencies, vec![Currency::default()]);
        assert_eq!(currencies[0].code, "USD");
    }

    #[test]
    fn bundled_list_loads() {
        let currencies = load_currencies("static/currencies.json");
        assert!(currencies.len() > 1);
        assert!(currencies.iter().any(|c| c.code == "EUR" && c.symbol == "€"));
    }
}
