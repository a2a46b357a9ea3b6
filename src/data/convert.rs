use crate::error::HoboError;

use super::model::{Column, ColumnLabel, HoboDataset, Value};

/// Variable name Hobo uses for temperature channels.
pub const TEMPERATURE: &str = "Temp";
pub const FAHRENHEIT: &str = "°F";
pub const CELSIUS: &str = "°C";

pub fn fahrenheit_to_celsius_value(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

/// Mirror the Fahrenheit column `label` into a `°C` column with the same
/// variable and serial. The source column is left untouched.
///
/// Fails with [`HoboError::NotFahrenheit`] when `label` is not a `°F` label,
/// before the dataset is looked at.
pub fn fahrenheit_to_celsius<'a>(
    dataset: &'a mut HoboDataset,
    label: &ColumnLabel,
) -> Result<&'a Column, HoboError> {
    if label.unit.as_deref() != Some(FAHRENHEIT) {
        return Err(HoboError::NotFahrenheit {
            label: label.clone(),
        });
    }

    let source = dataset
        .column(label)
        .ok_or_else(|| HoboError::ColumnNotFound {
            label: label.clone(),
        })?;

    let values = source
        .values
        .iter()
        .enumerate()
        .map(|(row, v)| match v {
            Value::Number(f) => Ok(Value::Number(fahrenheit_to_celsius_value(*f))),
            Value::Missing => Ok(Value::Missing),
            Value::Text(_) => Err(HoboError::NonNumeric {
                label: label.clone(),
                row,
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let target = label.with_unit(CELSIUS);
    log::debug!("Converted '{label}' into '{target}'");

    Ok(dataset.insert_column(Column {
        label: target,
        values,
    }))
}

/// Convert every `Temp, °F` column of the dataset. Returns how many columns
/// were converted; a dataset without Fahrenheit temperatures is left as is.
pub fn convert_all_temperatures(dataset: &mut HoboDataset) -> Result<usize, HoboError> {
    let labels: Vec<ColumnLabel> = dataset
        .select(TEMPERATURE, FAHRENHEIT)
        .into_iter()
        .map(|c| c.label.clone())
        .collect();

    for label in &labels {
        fahrenheit_to_celsius(dataset, label)?;
    }
    Ok(labels.len())
}
