//! Column width algorithms: flex distribution and sizing to fit.
//!
//! These functions only change widths. The column model decides when they
//! run and which events follow.

use std::collections::HashMap;
use std::sync::Arc;

use horizon_grid_core::logging::targets;

use crate::columns::column::Column;
use crate::options::ColumnLimit;

/// Result of distributing flex space.
#[derive(Debug, Default)]
pub struct FlexOutcome {
    /// Columns whose width was set, flexing or clamped.
    pub changed: Vec<Arc<Column>>,
    /// Columns that ended up flexing.
    pub flexing: Vec<Arc<Column>>,
}

/// Share `viewport_width` among the flex columns of `center_cols`.
///
/// Columns up to the last of `resizing` are left alone, as are columns
/// without flex. A column whose share falls outside its limits is clamped
/// and stops flexing, and the remaining space is shared again.
pub fn refresh_flexed_columns(
    center_cols: &[Arc<Column>],
    viewport_width: f32,
    resizing: &[Arc<Column>],
) -> FlexOutcome {
    let mut outcome = FlexOutcome::default();
    if viewport_width <= 0.0 {
        return outcome;
    }

    let flex_after = center_cols
        .iter()
        .rposition(|c| resizing.iter().any(|r| Arc::ptr_eq(r, c)));

    let mut known_width = 0.0;
    let mut flexing: Vec<Arc<Column>> = Vec::new();
    let mut min_flexed_width = 0.0;
    let mut total_flex = 0.0;
    for (index, column) in center_cols.iter().enumerate() {
        let after_resize = flex_after.is_none_or(|last| index > last);
        if column.is_flex() && after_resize {
            total_flex += column.flex();
            min_flexed_width += column.min_width();
            flexing.push(column.clone());
        } else {
            known_width += column.actual_width();
        }
    }
    if flexing.is_empty() {
        return outcome;
    }

    if known_width + min_flexed_width > viewport_width {
        // Not even the minimum widths fit, nothing flexes.
        for column in &flexing {
            column.set_minimum();
        }
        outcome.changed = flexing;
        return outcome;
    }

    let mut sizes: Vec<f32>;
    let mut space;
    'outer: loop {
        space = viewport_width - known_width;
        let space_per_flex = space / total_flex;
        sizes = Vec::with_capacity(flexing.len());
        for index in 0..flexing.len() {
            let column = &flexing[index];
            let by_flex = space_per_flex * column.flex();
            let constrained = if by_flex < column.min_width() {
                Some(column.min_width())
            } else if by_flex > column.max_width() {
                Some(column.max_width())
            } else {
                None
            };
            if let Some(width) = constrained {
                let column = flexing.remove(index);
                column.set_actual_width(width);
                total_flex -= column.flex();
                known_width += column.actual_width();
                outcome.changed.push(column);
                continue 'outer;
            }
            sizes.push(by_flex.floor());
        }
        break;
    }

    // The last column takes what rounding left over.
    let mut remaining = space;
    let last = flexing.len().saturating_sub(1);
    for (index, column) in flexing.iter().enumerate() {
        let width = if index == last { remaining } else { sizes[index].min(remaining) };
        column.set_actual_width(width);
        remaining -= sizes[index];
        outcome.changed.push(column.clone());
    }

    tracing::trace!(
        target: targets::COLUMN_SIZE,
        flexing = flexing.len(),
        viewport_width,
        "flex distributed"
    );
    outcome.flexing = flexing;
    outcome
}

/// Width limits applied while sizing to fit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SizeToFitParams {
    pub default_min_width: Option<f32>,
    pub default_max_width: Option<f32>,
    pub column_limits: Vec<ColumnLimit>,
}

impl SizeToFitParams {
    fn limits(&self) -> HashMap<&str, &ColumnLimit> {
        self.column_limits
            .iter()
            .map(|limit| (limit.col_id.as_str(), limit))
            .collect()
    }
}

fn width_of(columns: &[Arc<Column>]) -> f32 {
    columns.iter().map(|c| c.actual_width()).sum()
}

/// Scale `displayed` so they fill `grid_width`.
///
/// Columns with `suppressSizeToFit` keep their width. The others start from
/// their definition width so repeated calls do not drift. Returns the
/// columns that were sized, empty when nothing needed doing.
pub fn size_columns_to_fit(displayed: &[Arc<Column>], grid_width: f32, params: &SizeToFitParams) -> Vec<Arc<Column>> {
    if grid_width <= 0.0 || displayed.is_empty() || grid_width == width_of(displayed) {
        return Vec::new();
    }

    let limits = params.limits();
    let min_override = |column: &Column| {
        limits
            .get(column.id())
            .and_then(|l| l.min_width)
            .or(params.default_min_width)
    };
    let max_override = |column: &Column| {
        limits
            .get(column.id())
            .and_then(|l| l.max_width)
            .or(params.default_max_width)
    };

    let (mut to_spread, mut not_spread): (Vec<_>, Vec<_>) = displayed
        .iter()
        .cloned()
        .partition(|c| !c.is_suppress_size_to_fit());
    let sized = to_spread.clone();

    for column in &to_spread {
        column.reset_actual_width();
        let width = column.actual_width();
        match (min_override(column), max_override(column)) {
            (Some(min), _) if width < min => {
                column.set_actual_width(min);
            }
            (_, Some(max)) if width > max => {
                column.set_actual_width(max);
            }
            _ => {}
        }
    }

    let mut finished = false;
    while !finished {
        finished = true;
        let available = grid_width - width_of(&not_spread);
        if available <= 0.0 {
            for column in &to_spread {
                match min_override(column) {
                    Some(min) => {
                        column.set_actual_width(min);
                    }
                    None => {
                        column.set_minimum();
                    }
                }
            }
            continue;
        }

        let scale = available / width_of(&to_spread);
        let mut pixels_for_last = available;
        // Backwards, since clamped columns are taken out as we go.
        for index in (0..to_spread.len()).rev() {
            let column = to_spread[index].clone();
            let min_width = min_override(&column)
                .filter(|min| *min > column.min_width())
                .unwrap_or(column.min_width());
            let max_width = max_override(&column)
                .filter(|max| *max < column.max_width())
                .unwrap_or(column.max_width());

            let mut width = (column.actual_width() * scale).round();
            if width < min_width {
                width = min_width;
                not_spread.push(to_spread.remove(index));
                finished = false;
            } else if width > max_width {
                width = max_width;
                not_spread.push(to_spread.remove(index));
                finished = false;
            } else if index == 0 {
                width = pixels_for_last;
            }
            column.set_actual_width(width);
            pixels_for_last -= width;
        }
    }

    sized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::col_def::ColDef;
    use horizon_grid_core::BeanRegistry;

    fn col(beans: &BeanRegistry, id: &str, def: ColDef) -> Arc<Column> {
        Column::new(beans, def, None, id, true)
    }

    #[test]
    fn test_flex_shares_space_by_ratio() {
        let beans = BeanRegistry::new();
        let fixed = col(&beans, "fixed", ColDef::new().with_width(100.0));
        let one = col(&beans, "one", ColDef::new().with_flex(1.0));
        let two = col(&beans, "two", ColDef::new().with_flex(2.0));
        let cols = vec![fixed.clone(), one.clone(), two.clone()];

        let outcome = refresh_flexed_columns(&cols, 400.0, &[]);
        assert_eq!(outcome.flexing.len(), 2);
        assert_eq!(one.actual_width(), 100.0);
        assert_eq!(two.actual_width(), 200.0);
        assert_eq!(fixed.actual_width(), 100.0);
    }

    #[test]
    fn test_flex_respects_max_width() {
        let beans = BeanRegistry::new();
        let capped = col(
            &beans,
            "capped",
            ColDef::new().with_flex(1.0).with_width_limits(None, Some(50.0)),
        );
        let free = col(&beans, "free", ColDef::new().with_flex(1.0));
        let outcome = refresh_flexed_columns(&[capped.clone(), free.clone()], 300.0, &[]);

        assert_eq!(capped.actual_width(), 50.0);
        assert_eq!(free.actual_width(), 250.0);
        assert_eq!(outcome.flexing.len(), 1);
        assert_eq!(outcome.changed.len(), 2);
    }

    #[test]
    fn test_columns_before_a_resize_do_not_flex() {
        let beans = BeanRegistry::new();
        let before = col(&beans, "before", ColDef::new().with_flex(1.0).with_width(120.0));
        let resized = col(&beans, "resized", ColDef::new().with_width(80.0));
        let after = col(&beans, "after", ColDef::new().with_flex(1.0));
        let outcome = refresh_flexed_columns(&[before.clone(), resized.clone(), after.clone()], 500.0, &[resized]);

        assert_eq!(outcome.flexing.len(), 1);
        assert_eq!(after.actual_width(), 500.0 - 80.0 - before.actual_width());
    }

    #[test]
    fn test_size_to_fit_fills_the_width() {
        let beans = BeanRegistry::new();
        let cols = vec![
            col(&beans, "a", ColDef::new().with_width(100.0)),
            col(&beans, "b", ColDef::new().with_width(100.0)),
            col(&beans, "c", ColDef::new().with_width(100.0)),
        ];
        let sized = size_columns_to_fit(&cols, 601.0, &SizeToFitParams::default());
        assert_eq!(sized.len(), 3);
        assert_eq!(width_of(&cols), 601.0);
        assert_eq!(cols[1].actual_width(), 200.0);
    }

    #[test]
    fn test_size_to_fit_honours_limits_and_suppression() {
        let beans = BeanRegistry::new();
        let kept = col(&beans, "kept", ColDef {
            suppress_size_to_fit: Some(true),
            ..ColDef::new().with_width(100.0)
        });
        let limited = col(&beans, "limited", ColDef::new().with_width(100.0));
        let free = col(&beans, "free", ColDef::new().with_width(100.0));
        let params = SizeToFitParams {
            column_limits: vec![ColumnLimit {
                col_id: "limited".into(),
                min_width: None,
                max_width: Some(150.0),
            }],
            ..Default::default()
        };
        let cols = vec![kept.clone(), limited.clone(), free.clone()];
        size_columns_to_fit(&cols, 700.0, &params);

        assert_eq!(kept.actual_width(), 100.0);
        assert_eq!(limited.actual_width(), 150.0);
        assert_eq!(free.actual_width(), 450.0);
    }

    #[test]
    fn test_size_to_fit_is_a_noop_when_already_fitting() {
        let beans = BeanRegistry::new();
        let cols = vec![col(&beans, "a", ColDef::new().with_width(100.0))];
        assert!(size_columns_to_fit(&cols, 100.0, &SizeToFitParams::default()).is_empty());
        assert!(size_columns_to_fit(&cols, 0.0, &SizeToFitParams::default()).is_empty());
    }
}
