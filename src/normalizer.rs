//! 生レコードの検証・正規化
//!
//! デコーダーのバージョン差（alt_baro/altitude、gs/speed等）をここで
//! 吸収し、以降は強い型の[`AircraftReport`]だけを流す。純粋関数のみ。

use crate::types::{AircraftReport, RawAircraft};
use serde_json::Value;
use tracing::debug;

/// 生レコード列を正規化する
///
/// 緯度・経度のどちらかを欠くレコードは丸ごと捨てる。入力順は保存する。
pub fn normalize(raw: Vec<RawAircraft>) -> Vec<AircraftReport> {
    let total = raw.len();
    let reports: Vec<AircraftReport> = raw.into_iter().filter_map(normalize_one).collect();

    if reports.len() < total {
        debug!(
            dropped = total - reports.len(),
            kept = reports.len(),
            "Dropped records without position"
        );
    }
    reports
}

/// 1レコードの正規化
///
/// 文字列フィールドは`icao`・`flight`とも前後の空白を除去する
/// （デコーダーは便名を8文字固定幅でパディングして返す）。
fn normalize_one(record: RawAircraft) -> Option<AircraftReport> {
    let latitude = number(record.get("lat"))?;
    let longitude = number(record.get("lon"))?;

    Some(AircraftReport {
        icao: string_or(&record, "hex", "unknown"),
        flight: string_or(&record, "flight", "N/A"),
        latitude,
        longitude,
        altitude: number_fallback(&record, "alt_baro", "altitude"),
        heading: number(record.get("track")).unwrap_or(0.0),
        speed: number_fallback(&record, "gs", "speed"),
    })
}

/// JSON値を数値として読む（整数・小数の両方を受ける）
fn number(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64)
}

/// 第1キー→第2キーの順に数値を探し、無ければ0
fn number_fallback(record: &RawAircraft, primary: &str, secondary: &str) -> f64 {
    number(record.get(primary))
        .or_else(|| number(record.get(secondary)))
        .unwrap_or(0.0)
}

/// 文字列フィールドを取り出してトリムする。欠落・非文字列はデフォルト値
fn string_or(record: &RawAircraft, key: &str, default: &str) -> String {
    match record.get(key).and_then(Value::as_str) {
        Some(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                default.to_string()
            } else {
                trimmed.to_string()
            }
        }
        None => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawAircraft {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be a JSON object"),
        }
    }

    #[test]
    fn test_record_without_position_dropped() {
        let reports = normalize(vec![raw(json!({"lat": 1.0}))]);
        assert!(reports.is_empty());

        let reports = normalize(vec![raw(json!({"lon": 2.0}))]);
        assert!(reports.is_empty());
    }

    #[test]
    fn test_altitude_primary_field() {
        let reports = normalize(vec![raw(json!({"lat": 1.0, "lon": 2.0, "alt_baro": 500}))]);
        assert_eq!(reports[0].altitude, 500.0);
    }

    #[test]
    fn test_altitude_secondary_field() {
        let reports = normalize(vec![raw(json!({"lat": 1.0, "lon": 2.0, "altitude": 300}))]);
        assert_eq!(reports[0].altitude, 300.0);
    }

    #[test]
    fn test_altitude_primary_wins_over_secondary() {
        let reports = normalize(vec![raw(
            json!({"lat": 1.0, "lon": 2.0, "alt_baro": 500, "altitude": 300}),
        )]);
        assert_eq!(reports[0].altitude, 500.0);
    }

    #[test]
    fn test_altitude_defaults_to_zero() {
        let reports = normalize(vec![raw(json!({"lat": 1.0, "lon": 2.0}))]);
        assert_eq!(reports[0].altitude, 0.0);
    }

    #[test]
    fn test_speed_fallback_chain() {
        let reports = normalize(vec![raw(json!({"lat": 1.0, "lon": 2.0, "gs": 250}))]);
        assert_eq!(reports[0].speed, 250.0);

        let reports = normalize(vec![raw(json!({"lat": 1.0, "lon": 2.0, "speed": 180}))]);
        assert_eq!(reports[0].speed, 180.0);

        let reports = normalize(vec![raw(json!({"lat": 1.0, "lon": 2.0}))]);
        assert_eq!(reports[0].speed, 0.0);
    }

    #[test]
    fn test_flight_trimmed() {
        let reports = normalize(vec![raw(
            json!({"lat": 1.0, "lon": 2.0, "flight": "  ABC123  "}),
        )]);
        assert_eq!(reports[0].flight, "ABC123");
    }

    #[test]
    fn test_flight_defaults() {
        let reports = normalize(vec![raw(json!({"lat": 1.0, "lon": 2.0}))]);
        assert_eq!(reports[0].flight, "N/A");

        // 空白だけの便名も欠落扱い
        let reports = normalize(vec![raw(json!({"lat": 1.0, "lon": 2.0, "flight": "   "}))]);
        assert_eq!(reports[0].flight, "N/A");
    }

    #[test]
    fn test_icao_trimmed_like_flight() {
        let reports = normalize(vec![raw(json!({"lat": 1.0, "lon": 2.0, "hex": " ae1460 "}))]);
        assert_eq!(reports[0].icao, "ae1460");

        let reports = normalize(vec![raw(json!({"lat": 1.0, "lon": 2.0}))]);
        assert_eq!(reports[0].icao, "unknown");
    }

    #[test]
    fn test_heading_from_track() {
        let reports = normalize(vec![raw(json!({"lat": 1.0, "lon": 2.0, "track": 270}))]);
        assert_eq!(reports[0].heading, 270.0);

        let reports = normalize(vec![raw(json!({"lat": 1.0, "lon": 2.0}))]);
        assert_eq!(reports[0].heading, 0.0);
    }

    #[test]
    fn test_order_preserved() {
        let reports = normalize(vec![
            raw(json!({"lat": 1.0, "lon": 2.0, "hex": "a"})),
            raw(json!({"lon": 99.0})),
            raw(json!({"lat": 3.0, "lon": 4.0, "hex": "b"})),
        ]);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].icao, "a");
        assert_eq!(reports[1].icao, "b");
    }

    #[test]
    fn test_non_numeric_position_dropped() {
        let reports = normalize(vec![raw(json!({"lat": "x", "lon": 2.0}))]);
        assert!(reports.is_empty());
    }
}
