// smbg extraction and mmol/L -> mg/dL conversion

use crate::models::{NormalizedReading, RawMeasurement, Subtype};

/// mg/dL per mmol/L for glucose.
pub const MMOL_TO_MGDL: f64 = 18.0;

/// Native unit the conversion factor assumes.
pub const NATIVE_UNITS: &str = "mmol/L";

/// Keep `subtype` entries in feed order and reduce each to date, time and mg/dL.
///
/// Other subtypes are dropped silently. Matching entries without a usable
/// `deviceTime` or `value` are skipped with a warning. Entries that declare a
/// unit other than mmol/L are still scaled by the fixed factor but counted and
/// logged, since the feed is expected to normalise to mmol/L.
pub fn extract(measurements: &[RawMeasurement], subtype: Subtype) -> Vec<NormalizedReading> {
    let mut readings = Vec::new();
    let mut skipped = 0usize;
    let mut foreign_units = 0usize;

    for m in measurements.iter().filter(|m| m.kind == subtype.as_str()) {
        if m.units
            .as_deref()
            .is_some_and(|u| !u.eq_ignore_ascii_case(NATIVE_UNITS))
        {
            foreign_units += 1;
        }
        match normalize(m) {
            Some(reading) => readings.push(reading),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "skipped readings without a usable deviceTime or value");
    }
    if foreign_units > 0 {
        tracing::warn!(
            count = foreign_units,
            expected = NATIVE_UNITS,
            "readings report units other than mmol/L; converted with the mmol/L factor"
        );
    }
    readings
}

fn normalize(m: &RawMeasurement) -> Option<NormalizedReading> {
    let device_time = m.device_time.as_deref()?;
    let (date, time) = split_device_time(device_time)?;
    let value = to_display_value(m.value?);
    Some(NormalizedReading::new(date, time, value))
}

/// `2021-03-17T08:33:00...` -> (`2021-03-17`, `08:33:00`). Device-local, no zone shift.
pub fn split_device_time(device_time: &str) -> Option<(&str, &str)> {
    let date = device_time.get(0..10)?;
    let time = device_time.get(11..19)?;
    Some((date, time))
}

/// mmol/L to mg/dL, truncated toward zero.
pub fn to_display_value(mmol: f64) -> String {
    ((mmol * MMOL_TO_MGDL).trunc() as i64).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(kind: &str, device_time: &str, value: f64) -> RawMeasurement {
        RawMeasurement {
            kind: kind.into(),
            device_time: Some(device_time.into()),
            value: Some(value),
            ..Default::default()
        }
    }

    #[test]
    fn conversion_truncates_toward_zero() {
        assert_eq!(to_display_value(5.5), "99");
        assert_eq!(to_display_value(-0.1), "-1");
        assert_eq!(to_display_value(6.1), "109");
        assert_eq!(to_display_value(0.0), "0");
    }

    #[test]
    fn device_time_slicing() {
        assert_eq!(
            split_device_time("2021-03-17T08:33:00"),
            Some(("2021-03-17", "08:33:00"))
        );
        assert_eq!(
            split_device_time("2021-03-17T08:33:00.000Z"),
            Some(("2021-03-17", "08:33:00"))
        );
        assert_eq!(split_device_time("2021-03-17"), None);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(extract(&[], Subtype::Smbg).is_empty());
    }

    #[test]
    fn keeps_only_smbg_in_feed_order() {
        let input = vec![
            raw("smbg", "2021-03-17T08:33:00", 5.5),
            raw("cbg", "2021-03-17T08:35:00", 7.0),
            raw("smbg", "2021-03-16T21:10:05", 6.1),
            raw("basal", "2021-03-16T22:00:00", 0.9),
            raw("smbg", "2021-03-18T07:00:00", 4.2),
        ];
        let out = extract(&input, Subtype::Smbg);
        assert!(out.len() <= input.len());
        assert_eq!(
            out,
            vec![
                NormalizedReading::new("2021-03-17", "08:33:00", "99"),
                NormalizedReading::new("2021-03-16", "21:10:05", "109"),
                NormalizedReading::new("2021-03-18", "07:00:00", "75"),
            ]
        );
    }

    #[test]
    fn skips_smbg_without_time_or_value() {
        let mut no_value = raw("smbg", "2021-03-17T08:33:00", 0.0);
        no_value.value = None;
        let mut short_time = raw("smbg", "2021-03", 5.0);
        short_time.units = Some("mmol/L".into());
        let input = vec![no_value, short_time, raw("smbg", "2021-03-17T09:00:00", 5.0)];
        let out = extract(&input, Subtype::Smbg);
        assert_eq!(out, vec![NormalizedReading::new("2021-03-17", "09:00:00", "90")]);
    }

    #[test]
    fn foreign_units_still_use_fixed_factor() {
        let mut m = raw("smbg", "2021-03-17T08:33:00", 100.0);
        m.units = Some("mg/dL".into());
        let out = extract(&[m], Subtype::Smbg);
        assert_eq!(out[0].value(), "1800");
    }
}
