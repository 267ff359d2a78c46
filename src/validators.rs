//! Brazilian tax-id (CPF/CNPJ) checksum validation and display formatting.
//!
//! Both algorithms are weighted modulo-11 check-digit schemes; ids whose
//! digits are all equal pass the arithmetic but are not valid ids and are
//! rejected explicitly.

/// Strip everything but ASCII digits.
pub fn normalize_digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Validate an 11-digit CPF. Returns `Ok(())` or a field-free error message.
pub fn validate_cpf(cpf: &str) -> Result<(), String> {
    let cpf = normalize_digits(cpf);

    if cpf.len() != 11 {
        return Err("CPF must have 11 digits".to_string());
    }

    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.windows(2).all(|w| w[0] == w[1]) {
        return Err("invalid CPF".to_string());
    }

    let first: u32 = (0..9).map(|i| digits[i] * (10 - i as u32)).sum();
    let first = match 11 - (first % 11) {
        d if d >= 10 => 0,
        d => d,
    };

    let second: u32 = (0..10).map(|i| digits[i] * (11 - i as u32)).sum();
    let second = match 11 - (second % 11) {
        d if d >= 10 => 0,
        d => d,
    };

    if digits[9] != first || digits[10] != second {
        return Err("invalid CPF".to_string());
    }

    Ok(())
}

/// Validate a 14-digit CNPJ. Returns `Ok(())` or a field-free error message.
pub fn validate_cnpj(cnpj: &str) -> Result<(), String> {
    let cnpj = normalize_digits(cnpj);

    if cnpj.len() != 14 {
        return Err("CNPJ must have 14 digits".to_string());
    }

    let digits: Vec<u32> = cnpj.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.windows(2).all(|w| w[0] == w[1]) {
        return Err("invalid CNPJ".to_string());
    }

    const FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
    let first: u32 = FIRST_WEIGHTS
        .iter()
        .zip(&digits)
        .map(|(w, d)| w * d)
        .sum();
    let first = match 11 - (first % 11) {
        d if d >= 10 => 0,
        d => d,
    };

    const SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
    let second: u32 = SECOND_WEIGHTS
        .iter()
        .zip(digits.iter().take(12).chain(std::iter::once(&first)))
        .map(|(w, d)| w * d)
        .sum();
    let second = match 11 - (second % 11) {
        d if d >= 10 => 0,
        d => d,
    };

    if digits[12] != first || digits[13] != second {
        return Err("invalid CNPJ".to_string());
    }

    Ok(())
}

/// Format a CPF as 000.000.000-00; ids of unexpected length pass through.
pub fn format_cpf(cpf: &str) -> String {
    let cpf = normalize_digits(cpf);
    if cpf.len() == 11 {
        format!("{}.{}.{}-{}", &cpf[..3], &cpf[3..6], &cpf[6..9], &cpf[9..])
    } else {
        cpf
    }
}

/// Format a CNPJ as 00.000.000/0000-00; ids of unexpected length pass through.
pub fn format_cnpj(cnpj: &str) -> String {
    let cnpj = normalize_digits(cnpj);
    if cnpj.len() == 14 {
        format!(
            "{}.{}.{}/{}-{}",
            &cnpj[..2],
            &cnpj[2..5],
            &cnpj[5..8],
            &cnpj[8..12],
            &cnpj[12..]
        )
    } else {
        cnpj
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("52998224725")]
    #[case("529.982.247-25")]
    #[case("11144477735")]
    fn accepts_valid_cpf(#[case] cpf: &str) {
        assert!(validate_cpf(cpf).is_ok());
    }

    #[rstest]
    #[case("52998224726", "invalid CPF")] // wrong second check digit
    #[case("52998224715", "invalid CPF")] // wrong first check digit
    #[case("11111111111", "invalid CPF")] // repeated digits
    #[case("5299822472", "CPF must have 11 digits")]
    #[case("", "CPF must have 11 digits")]
    fn rejects_invalid_cpf(#[case] cpf: &str, #[case] message: &str) {
        assert_eq!(validate_cpf(cpf), Err(message.to_string()));
    }

    #[rstest]
    #[case("11222333000181")]
    #[case("11.222.333/0001-81")]
    fn accepts_valid_cnpj(#[case] cnpj: &str) {
        assert!(validate_cnpj(cnpj).is_ok());
    }

    #[rstest]
    #[case("11222333000182", "invalid CNPJ")]
    #[case("00000000000000", "invalid CNPJ")]
    #[case("1122233300018", "CNPJ must have 14 digits")]
    fn rejects_invalid_cnpj(#[case] cnpj: &str, #[case] message: &str) {
        assert_eq!(validate_cnpj(cnpj), Err(message.to_string()));
    }

    #[test]
    fn formats_ids_for_display() {
        assert_eq!(format_cpf("52998224725"), "529.982.247-25");
        assert_eq!(format_cnpj("11222333000181"), "11.222.333/0001-81");
        // unexpected lengths pass through untouched
        assert_eq!(format_cpf("123"), "123");
        assert_eq!(format_cnpj("123"), "123");
    }
}
