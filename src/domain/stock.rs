// Stock domain model - warehouse inventory items
use super::lenient::lenient_u32;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    #[serde(default)]
    pub stock_code: String,
    #[serde(default)]
    pub stock_name: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub current_stock: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub safety_stock: u32,
    #[serde(default)]
    pub stock_location: String,
    #[serde(default)]
    pub partner_company: String,
    #[serde(default)]
    pub inbound_date: Option<String>,
}

impl StockItem {
    pub fn list_from_json(value: serde_json::Value) -> Result<Vec<Self>, serde_json::Error> {
        if !value.is_array() {
            return Err(serde::de::Error::custom("stock payload is not a list"));
        }
        serde_json::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_backend_entity_fields() {
        let payload = json!([{
            "stockId": 3,
            "stockCode": "C3003",
            "stockName": "도어 패널",
            "currentStock": 120,
            "safetyStock": 50,
            "stockLocation": "창고3",
            "partnerCompany": "한온시스템",
            "inboundDate": "2025-06-12",
            "stockState": "정상"
        }]);

        let items = StockItem::list_from_json(payload).unwrap();
        assert_eq!(items[0].stock_code, "C3003");
        assert_eq!(items[0].current_stock, 120);
        assert_eq!(items[0].inbound_date.as_deref(), Some("2025-06-12"));
    }

    #[test]
    fn test_missing_fields_default() {
        let items = StockItem::list_from_json(json!([{ "stockName": "변속기" }])).unwrap();
        assert_eq!(items[0].current_stock, 0);
        assert_eq!(items[0].stock_code, "");
        assert!(StockItem::list_from_json(json!({})).is_err());
    }
}
