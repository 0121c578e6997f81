use crate::errors::RulesheetError;

/// Create a string of all available items.
pub fn items_to_strings(items: Vec<&str>) -> String {
    let mut s = String::new();
    for i in items {
        s.push_str(i);
        s.push_str(&String::from(", "));
    }
    s
}

// Validation
pub fn validate_float_parameter(value: f64, min: f64, max: f64, parameter: &str) -> Result<(), RulesheetError> {
    if value.is_nan() || value < min || max < value {
        let ex_msg = format!("real value within range {} and {}", min, max);
        Err(RulesheetError::InvalidParameter(
            parameter.to_string(),
            ex_msg,
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Shannon entropy, in bits, of a class histogram.
/// Empty classes contribute nothing (0 log 0 = 0).
pub fn entropy(counts: &[usize]) -> f64 {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Class histogram for the rows in `index`.
pub fn class_counts(index: &[usize], outputs: &[u16], class_count: usize) -> Vec<usize> {
    let mut counts = vec![0; class_count];
    for &i in index {
        counts[outputs[i] as usize] += 1;
    }
    counts
}

/// Most frequent class in a histogram, ties go to the lowest class code.
pub fn majority_class(counts: &[usize]) -> u16 {
    let mut best = 0;
    for (class, &c) in counts.iter().enumerate() {
        if c > counts[best] {
            best = class;
        }
    }
    best as u16
}

/// Rows of a histogram that the majority class does not explain.
#[inline]
pub fn misclassified(counts: &[usize]) -> usize {
    let total: usize = counts.iter().sum();
    total - counts[majority_class(counts) as usize]
}

/// Reorder `index` so rows are grouped by their value of `feature`, keeping the
/// relative order of rows within a group. Returns the `(start, stop)` range of
/// each value `0..arity` within `index`; values no row takes get an empty range.
pub fn pivot_on_attribute(index: &mut [usize], feature: &[u16], arity: usize) -> Vec<(usize, usize)> {
    let mut counts = vec![0; arity];
    for &i in index.iter() {
        counts[feature[i] as usize] += 1;
    }

    let mut ranges = Vec::with_capacity(arity);
    let mut start = 0;
    for c in counts {
        ranges.push((start, start + c));
        start += c;
    }

    let mut next: Vec<usize> = ranges.iter().map(|r| r.0).collect();
    let rows = index.to_vec();
    for i in rows {
        let v = feature[i] as usize;
        index[next[v]] = i;
        next[v] += 1;
    }
    ranges
}

/// Naive English singular form of a table name, used as the rulesheet entity
/// when the caller does not provide one.
pub fn singularize(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with("ies") && name.len() > 3 {
        format!("{}y", &name[..name.len() - 3])
    } else if lower.ends_with("sses") || lower.ends_with("xes") || lower.ends_with("ches") || lower.ends_with("shes") {
        name[..name.len() - 2].to_string()
    } else if lower.ends_with('s') && !lower.ends_with("ss") && name.len() > 1 {
        name[..name.len() - 1].to_string()
    } else {
        name.to_string()
    }
}

#[inline]
pub fn precision_round(n: f64, precision: i32) -> f64 {
    let p = (10.0_f64).powi(precision);
    (n * p).round() / p
}
