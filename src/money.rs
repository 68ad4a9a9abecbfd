use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const CENTS_PER_UNIT: Decimal = dec!(100);

/// Round a monetary value up to 2 decimal places (ceiling, never to nearest).
/// Commission fees are always charged in the customer's disfavour, so any
/// fraction of a cent becomes a whole cent.
pub fn round_up(value: Decimal) -> Decimal {
    (value * CENTS_PER_UNIT).ceil() / CENTS_PER_UNIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_fractions_of_a_cent_up() {
        assert_eq!(round_up(dec!(0.001)), dec!(0.01));
        assert_eq!(round_up(dec!(0.099)), dec!(0.10));
        assert_eq!(round_up(dec!(0.999)), dec!(1.00));
        assert_eq!(round_up(dec!(7.001)), dec!(7.01));
        assert_eq!(round_up(dec!(123.456)), dec!(123.46));
    }

    #[test]
    fn leaves_exact_cent_values_unchanged() {
        assert_eq!(round_up(dec!(0)), dec!(0));
        assert_eq!(round_up(dec!(0.30)), dec!(0.30));
        assert_eq!(round_up(dec!(1000.00)), dec!(1000.00));
    }

    #[test]
    fn result_is_a_whole_number_of_cents_and_never_below_input() {
        let samples = [
            dec!(0.0001),
            dec!(0.694819732880412),
            dec!(66.4819732880412),
            dec!(123.456),
            dec!(8611.409999999999766),
        ];
        for value in samples {
            let rounded = round_up(value);
            assert_eq!(rounded * dec!(100), (rounded * dec!(100)).trunc());
            assert!(rounded >= value);
            assert!(rounded - value < dec!(0.01));
        }
    }
}
