//! 型定義
//!
//! デコーダーから受け取る生レコードと、コレクターへ送る正規化済みレポート

use serde::{Deserialize, Serialize};

/// デコーダーのエンドポイントから受信したままの1レコード
///
/// キー構成はデコーダーのバージョンにより揺れるため、正規化されるまでは
/// 緩い連想マップのまま扱う。この型は`normalizer`の外へは出さない。
pub type RawAircraft = serde_json::Map<String, serde_json::Value>;

/// コレクターへ送信する正規化済み航空機レポート
///
/// ワイヤーフォーマット（JSON）:
///
/// ```json
/// {
///   "icao": "ae1460",
///   "flight": "JAL123",
///   "latitude": 35.6,
///   "longitude": 139.7,
///   "altitude": 38000.0,
///   "heading": 270.0,
///   "speed": 450.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftReport {
    /// ICAO 24bitアドレス（16進文字列、不明時は"unknown"）
    pub icao: String,
    /// 便名（不明時は"N/A"）
    pub flight: String,
    /// 緯度（必須）
    pub latitude: f64,
    /// 経度（必須）
    pub longitude: f64,
    /// 高度（フィート、不明時は0）
    pub altitude: f64,
    /// 針路（度、不明時は0）
    pub heading: f64,
    /// 対地速度（ノット、不明時は0）
    pub speed: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aircraft_report_wire_format() {
        let report = AircraftReport {
            icao: "ae1460".to_string(),
            flight: "JAL123".to_string(),
            latitude: 35.6,
            longitude: 139.7,
            altitude: 38000.0,
            heading: 270.0,
            speed: 450.0,
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["icao"], "ae1460");
        assert_eq!(json["flight"], "JAL123");
        assert_eq!(json["latitude"], 35.6);
        assert_eq!(json["longitude"], 139.7);
        assert_eq!(json["altitude"], 38000.0);
        assert_eq!(json["heading"], 270.0);
        assert_eq!(json["speed"], 450.0);
    }

    #[test]
    fn test_aircraft_report_roundtrip() {
        let report = AircraftReport {
            icao: "unknown".to_string(),
            flight: "N/A".to_string(),
            latitude: 1.0,
            longitude: 2.0,
            altitude: 0.0,
            heading: 0.0,
            speed: 0.0,
        };

        let json = serde_json::to_string(&report).unwrap();
        let parsed: AircraftReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
