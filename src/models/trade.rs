use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TradeType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeType {
    Buy,
    Sell,
}

// ---------------------------------------------------------------------------
// Trade
// ---------------------------------------------------------------------------

/// One executed transaction of a master. Trades carry no owner field; the
/// service scopes them by address at fetch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    pub time: String,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub token: String,
    pub token_amount: f64,
    pub token_address: String,
    pub amount_usd: f64,
    pub transaction_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_json_shape() {
        let json = serde_json::json!({
            "id": "trade-0",
            "time": "2025-03-01T12:00:00.000Z",
            "type": "SELL",
            "token": "JTO",
            "tokenAmount": 12.5,
            "tokenAddress": "abc...def",
            "amountUsd": 99.0,
            "transactionHash": "hash...tail",
        });

        let trade: Trade = serde_json::from_value(json).unwrap();
        assert_eq!(trade.trade_type, TradeType::Sell);
        assert_eq!(trade.token_address, "abc...def");

        let back = serde_json::to_value(&trade).unwrap();
        assert_eq!(back["type"], "SELL");
        assert_eq!(back["amountUsd"], 99.0);
    }
}
