/// Folds a spreadsheet label into a comparison key: lowercase, Portuguese
/// accents stripped, spaces, dashes and underscores removed.
pub fn fold_key(value: &str) -> String {
    value
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| !matches!(c, ' ' | '_' | '-' | '.'))
        .map(strip_accent)
        .collect()
}

fn strip_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_key() {
        assert_eq!(fold_key("Compatível"), "compativel");
        assert_eq!(fold_key(" ID_Químico "), "idquimico");
        assert_eq!(fold_key("Não testado"), "naotestado");
        assert_eq!(fold_key("ChemicalID"), "chemicalid");
    }
}
