use crate::WallError;

/// Computes the color of a brick from the colors of the two bricks directly
/// above it. All values are palette indices.
pub trait ColorRule {
    fn compute(&self, left: usize, right: usize) -> usize;
    fn num_colors(&self) -> usize;

    /// Fails unless the rule is defined for every color of a palette with
    /// `num_colors` entries.
    fn ensure_covers(&self, num_colors: usize) -> Result<(), WallError> {
        if self.num_colors() < num_colors {
            return Err(WallError::InvalidRuleTable(format!(
                "rule covers {} colors, palette has {}",
                self.num_colors(),
                num_colors
            )));
        }
        Ok(())
    }
}

/// A rule given as a square lookup table, `table[left][right]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleTable {
    table: Vec<Vec<usize>>,
}

impl RuleTable {
    pub fn new(table: Vec<Vec<usize>>) -> Result<Self, WallError> {
        let num_colors = table.len();
        if num_colors == 0 {
            return Err(WallError::InvalidRuleTable("table is empty".to_string()));
        }
        for (left, row) in table.iter().enumerate() {
            if row.len() != num_colors {
                return Err(WallError::InvalidRuleTable(format!(
                    "row {} has {} entries, expected {}",
                    left,
                    row.len(),
                    num_colors
                )));
            }
            if let Some(&result) = row.iter().find(|&&result| result >= num_colors) {
                return Err(WallError::InvalidRuleTable(format!(
                    "row {} yields color {}, expected less than {}",
                    left, result, num_colors
                )));
            }
        }
        Ok(Self { table })
    }
}

impl ColorRule for RuleTable {
    fn compute(&self, left: usize, right: usize) -> usize {
        self.table[left][right]
    }

    fn num_colors(&self) -> usize {
        self.table.len()
    }
}

impl<F> ColorRule for (usize, F)
where
    F: Fn(usize, usize) -> usize,
{
    fn compute(&self, left: usize, right: usize) -> usize {
        (self.1)(left, right)
    }

    fn num_colors(&self) -> usize {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_looks_up_left_then_right() {
        let rule = RuleTable::new(vec![vec![0, 2, 1], vec![2, 1, 0], vec![1, 0, 2]]).unwrap();
        assert_eq!(rule.num_colors(), 3);
        assert_eq!(rule.compute(0, 1), 2);
        assert_eq!(rule.compute(1, 2), 0);
        assert_eq!(rule.compute(2, 0), 1);
    }

    #[test]
    fn table_must_be_square() {
        let result = RuleTable::new(vec![vec![0, 1], vec![1]]);
        assert!(matches!(result, Err(WallError::InvalidRuleTable(_))));
        assert!(RuleTable::new(vec![]).is_err());
    }

    #[test]
    fn table_entries_must_be_colors() {
        let result = RuleTable::new(vec![vec![0, 2], vec![1, 0]]);
        assert_eq!(
            result,
            Err(WallError::InvalidRuleTable(
                "row 0 yields color 2, expected less than 2".to_string()
            ))
        );
    }

    #[test]
    fn closure_with_color_count_is_a_rule() {
        let rule = (4usize, |left: usize, right: usize| (left + right) % 4);
        assert_eq!(rule.compute(3, 2), 1);
        assert_eq!(rule.num_colors(), 4);
    }

    #[test]
    fn rule_must_cover_the_palette() {
        let rule = RuleTable::new(vec![vec![0, 1], vec![1, 0]]).unwrap();
        assert_eq!(rule.ensure_covers(1), Ok(()));
        assert_eq!(rule.ensure_covers(2), Ok(()));
        assert_eq!(
            rule.ensure_covers(3),
            Err(WallError::InvalidRuleTable(
                "rule covers 2 colors, palette has 3".to_string()
            ))
        );
    }
}
