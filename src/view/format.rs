/// Display helpers shared by the card and detail views

/// Upper-case the first character, leave the rest alone
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// "#001", "#025", "#1025"
pub fn padded_id(id: u32) -> String {
    format!("#{:03}", id)
}

/// API heights and weights are in tenths of the display unit
pub fn tenths(value: u32) -> String {
    format!("{:.1}", value as f64 / 10.0)
}

pub fn join_capitalized(items: &[String], separator: &str) -> String {
    items
        .iter()
        .map(|item| capitalize(item))
        .collect::<Vec<_>>()
        .join(separator)
}

/// "viridian-forest-area" -> "Viridian forest area"
pub fn location_name(raw: &str) -> String {
    capitalize(&raw.replace('-', " "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("bulbasaur"), "Bulbasaur");
        assert_eq!(capitalize("mr-mime"), "Mr-mime");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_padded_id() {
        assert_eq!(padded_id(1), "#001");
        assert_eq!(padded_id(25), "#025");
        assert_eq!(padded_id(1025), "#1025");
    }

    #[test]
    fn test_tenths() {
        assert_eq!(tenths(7), "0.7");
        assert_eq!(tenths(69), "6.9");
        assert_eq!(tenths(1000), "100.0");
    }

    #[test]
    fn test_location_name() {
        assert_eq!(location_name("viridian-forest-area"), "Viridian forest area");
    }
}
