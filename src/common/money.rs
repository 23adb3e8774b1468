// src/common/money.rs

use rust_decimal::{Decimal, RoundingStrategy};

// Vendas são gravadas TTC (IVA de 20% incluso)
pub const VAT_DIVISOR: Decimal = Decimal::from_parts(120, 0, 0, false, 2);

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Arredonda para 2 casas, metade para longe do zero (0.625 -> 0.63).
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Converte um valor TTC em HT (sem arredondar).
pub fn ht_from_ttc(amount_ttc: Decimal) -> Decimal {
    amount_ttc / VAT_DIVISOR
}

/// round(revenue * percentage / 100, 2)
pub fn commission_for(revenue: Decimal, percentage: Decimal) -> Decimal {
    round_money(revenue * percentage / HUNDRED)
}
