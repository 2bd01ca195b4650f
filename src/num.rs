use alloy::primitives::{I256, U256};
use fastnum::{
    D256, UD256, bint,
    decimal::{Context, Decimal, RoundingMode, UnsignedDecimal},
};

/// Token smallest-units to decimal converter.
///
/// Conversion is exact for any `N` wide enough to hold a [`U256`],
/// i.e. `N >= 4`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Converter {
    decimals: i32,
}

impl Converter {
    pub fn new(decimals: u8) -> Self {
        Self {
            decimals: decimals as i32,
        }
    }

    pub fn decimals(&self) -> u8 {
        self.decimals as u8
    }

    pub fn from_unsigned<const N: usize>(&self, value: U256) -> UnsignedDecimal<N> {
        let unscaled = bint::UInt::<N>::from_le_slice(value.as_le_slice())
            .expect("Converter: U256 -> UInt::<N>");
        UnsignedDecimal::<N>::from_parts(
            unscaled,
            -self.decimals,
            Context::default().with_rounding_mode(RoundingMode::Floor),
        )
    }

    pub fn from_signed<const N: usize>(&self, value: I256) -> Decimal<N> {
        let unscaled = bint::UInt::<N>::from_le_slice(value.unsigned_abs().as_le_slice())
            .expect("Converter: abs(I256) -> UInt::<N>");
        Decimal::<N>::from_parts(
            unscaled,
            -self.decimals,
            match value.sign() {
                alloy::primitives::Sign::Negative => fastnum::decimal::Sign::Minus,
                alloy::primitives::Sign::Positive => fastnum::decimal::Sign::Plus,
            },
            Context::default().with_rounding_mode(RoundingMode::Floor),
        )
    }

    /// Token amount as a 256-bit unsigned decimal, trailing zeros stripped.
    pub fn amount(&self, value: U256) -> UD256 {
        self.from_unsigned(value).reduce()
    }

    /// Signed token balance as a 256-bit decimal, trailing zeros stripped.
    pub fn balance(&self, value: I256) -> D256 {
        self.from_signed(value).reduce()
    }
}

/// `inflow - outflow` in smallest units, `None` if either side
/// does not fit into [`I256`].
pub fn net(inflow: U256, outflow: U256) -> Option<I256> {
    let inflow = I256::try_from(inflow).ok()?;
    let outflow = I256::try_from(outflow).ok()?;
    inflow.checked_sub(outflow)
}

#[cfg(test)]
mod tests {
    use fastnum::{dec256, udec256};

    use super::*;

    fn ether(value: u64) -> U256 {
        U256::from(value) * U256::from(10).pow(U256::from(18))
    }

    #[test]
    fn test_converter_token_amounts() {
        assert_eq!(Converter::new(18).amount(ether(3)), udec256!(3));
        assert_eq!(
            Converter::new(18).amount(ether(1) / U256::from(2)),
            udec256!(0.5)
        );
        assert_eq!(Converter::new(6).amount(U256::from(1234567890)), udec256!(1234.56789));
        assert_eq!(Converter::new(0).amount(U256::from(42)), udec256!(42));
        assert!(!Converter::new(18).amount(U256::MAX).is_zero());
    }

    #[test]
    fn test_converter_signed_balances() {
        let minus_half = net(ether(1), ether(1) + ether(1) / U256::from(2)).unwrap();
        assert_eq!(Converter::new(18).balance(minus_half), dec256!(-0.5));
        assert_eq!(
            Converter::new(6).balance(I256::try_from(-1234567890).unwrap()),
            dec256!(-1234.56789)
        );
        assert_eq!(Converter::new(18).balance(I256::ZERO), dec256!(0));
    }

    #[test]
    fn test_converted_amounts_display_reduced() {
        let converter = Converter::new(18);
        assert_eq!(converter.amount(U256::ZERO).to_string(), "0");
        assert_eq!(converter.amount(ether(9)).to_string(), "9");
        assert_eq!(converter.amount(ether(10)).to_string(), "10");
        assert_eq!(converter.amount(ether(1) / U256::from(4)).to_string(), "0.25");
        assert_eq!(converter.balance(I256::ZERO).to_string(), "0");
        assert_eq!(
            converter
                .balance(net(ether(1), ether(3)).unwrap())
                .to_string(),
            "-2"
        );
    }

    #[test]
    fn test_net() {
        assert_eq!(net(ether(5), ether(1)), Some(I256::try_from(ether(4)).unwrap()));
        assert_eq!(net(ether(1), ether(5)), Some(-I256::try_from(ether(4)).unwrap()));
        assert_eq!(net(U256::MAX, U256::ZERO), None);
    }

    #[test]
    fn test_decimals() {
        assert_eq!(Converter::new(18).decimals(), 18);
        assert_eq!(Converter::default().decimals(), 0);
    }
}
