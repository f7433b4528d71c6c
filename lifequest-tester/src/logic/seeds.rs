use anyhow::{Result, bail};

/// Parse `--seeds` tokens. Negative numbers fold to their magnitude;
/// duplicates are dropped while keeping order.
pub fn resolve_seeds(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds = Vec::new();
    for token in tokens {
        let seed = if let Ok(value) = token.parse::<u64>() {
            value
        } else if let Ok(value) = token.parse::<i64>() {
            value.unsigned_abs()
        } else if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
            match u64::from_str_radix(hex, 16) {
                Ok(value) => value,
                Err(_) => bail!("invalid hex seed '{token}'"),
            }
        } else {
            bail!("invalid seed '{token}': expected an integer or 0x-prefixed hex");
        };
        if !seeds.contains(&seed) {
            seeds.push(seed);
        }
    }
    if seeds.is_empty() {
        bail!("no seeds given");
    }
    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn accepts_decimal_negative_and_hex() {
        let seeds = resolve_seeds(&tokens(&["1337", "-5", "0xFF", "1337"])).unwrap();
        assert_eq!(seeds, vec![1337, 5, 255]);
    }

    #[test]
    fn rejects_garbage_and_empty_input() {
        assert!(resolve_seeds(&tokens(&["banana"])).is_err());
        assert!(resolve_seeds(&[]).is_err());
    }
}
