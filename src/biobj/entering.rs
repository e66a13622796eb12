/*
 * Copyright (c) 2021, 2022 Frank Fischer <frank-fischer@shadow-soft.de>
 *
 * This program is free software: you can redistribute it and/or
 * modify it under the terms of the GNU General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful, but
 * WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
 * General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see  <http://www.gnu.org/licenses/>
 */

//! Ratio test for the next entering arc.

use thiserror::Error;

use crate::basis::BasisStatus;

/// No non-basic arc improves the second objective.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
#[error("no improving arc")]
pub struct NoImprovingArc;

/// The arc selected by [`entering_arc`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Candidate {
    pub arc: usize,
    /// The ratio `dj2 / dj1` of the arc.
    pub ratio: f64,
}

/// Select the next arc to enter the basis.
///
/// An arc is eligible if increasing it from its lower bound or
/// decreasing it from its upper bound improves the second objective,
/// i.e. if it is at its lower bound with `dj2 < 0` or at its upper
/// bound with `dj2 > 0`. Among all eligible arcs the one with the
/// smallest ratio `dj2 / dj1` is returned, ties are broken in favor of
/// the smallest index. Arcs with `dj1 == 0` have an infinite ratio and
/// are never selected.
///
/// Only the common prefix of the three slices is considered.
pub fn entering_arc(dj1: &[f64], dj2: &[f64], arcs: &[BasisStatus]) -> Result<Candidate, NoImprovingArc> {
    let mut best: Option<Candidate> = None;

    for (arc, ((&d1, &d2), &status)) in dj1.iter().zip(dj2).zip(arcs).enumerate() {
        let eligible = match status {
            BasisStatus::AtLower => d2 < 0.0,
            BasisStatus::AtUpper => d2 > 0.0,
            BasisStatus::Basic => false,
        };
        if !eligible || d1 == 0.0 {
            continue;
        }

        let ratio = d2 / d1;
        if best.map(|b| ratio < b.ratio).unwrap_or(true) {
            best = Some(Candidate { arc, ratio });
        }
    }

    best.ok_or(NoImprovingArc)
}

#[cfg(test)]
mod tests {
    use super::{entering_arc, Candidate, NoImprovingArc};
    use crate::basis::BasisStatus::*;

    #[test]
    fn smallest_ratio_wins() {
        let dj1 = [1.0, 1.0, 2.0, 1.0];
        let dj2 = [-5.0, 0.0, -4.0, -9.0];
        let arcs = [AtLower, AtLower, AtLower, AtLower];
        assert_eq!(
            entering_arc(&dj1, &dj2, &arcs),
            Ok(Candidate { arc: 3, ratio: -9.0 })
        );
    }

    #[test]
    fn first_arc_wins_ties() {
        let dj1 = [2.0, 1.0, 1.0];
        let dj2 = [-2.0, -1.0, -1.0];
        let arcs = [AtLower, AtLower, AtLower];
        assert_eq!(entering_arc(&dj1, &dj2, &arcs).map(|c| c.arc), Ok(0));
    }

    #[test]
    fn upper_bounded_arcs() {
        // decreasing an arc at its upper bound with positive dj2 improves
        let dj1 = [1.0, -1.0];
        let dj2 = [-1.0, 3.0];
        let arcs = [AtUpper, AtUpper];
        assert_eq!(
            entering_arc(&dj1, &dj2, &arcs),
            Ok(Candidate { arc: 1, ratio: -3.0 })
        );
    }

    #[test]
    fn basic_arcs_are_skipped() {
        let dj1 = [1.0, 1.0];
        let dj2 = [-7.0, -1.0];
        let arcs = [Basic, AtLower];
        assert_eq!(entering_arc(&dj1, &dj2, &arcs).map(|c| c.arc), Ok(1));
    }

    #[test]
    fn single_eligible_arc() {
        let dj1 = [1.0, 4.0, 1.0];
        let dj2 = [1.0, -0.5, 0.0];
        let arcs = [AtLower, AtLower, AtUpper];
        assert_eq!(entering_arc(&dj1, &dj2, &arcs).map(|c| c.arc), Ok(1));
        // the ratio does not matter if there is no other candidate
        let dj1 = [1.0, -1e-6, 1.0];
        assert_eq!(entering_arc(&dj1, &dj2, &arcs).map(|c| c.arc), Ok(1));
    }

    #[test]
    fn zero_first_reduced_cost_is_never_selected() {
        let dj1 = [0.0, 1.0];
        let dj2 = [-100.0, -1.0];
        let arcs = [AtLower, AtLower];
        assert_eq!(entering_arc(&dj1, &dj2, &arcs).map(|c| c.arc), Ok(1));

        let dj1 = [0.0];
        let dj2 = [-100.0];
        assert_eq!(entering_arc(&dj1, &dj2, &arcs[..1]), Err(NoImprovingArc));
    }

    #[test]
    fn no_eligible_arc() {
        let dj1 = [1.0, 1.0, 1.0];
        let dj2 = [0.0, 2.0, -1.0];
        let arcs = [AtLower, AtLower, AtUpper];
        assert_eq!(entering_arc(&dj1, &dj2, &arcs), Err(NoImprovingArc));
        assert_eq!(entering_arc(&[], &[], &[]), Err(NoImprovingArc));
    }

    #[test]
    fn common_prefix_only() {
        let dj1 = [1.0, 1.0, 1.0];
        let dj2 = [1.0, 1.0];
        let arcs = [AtLower, AtLower, AtLower];
        // arc 2 would be eligible by dj1 alone, but dj2 is too short
        assert_eq!(entering_arc(&dj1, &dj2, &arcs), Err(NoImprovingArc));

        let dj2 = [1.0, -1.0, -5.0];
        assert_eq!(entering_arc(&dj1, &dj2, &arcs[..2]).map(|c| c.arc), Ok(1));
    }

    #[test]
    fn selection_is_pure() {
        let dj1 = vec![1.0, 2.0, 1.0];
        let dj2 = vec![-1.0, -6.0, -2.0];
        let arcs = vec![AtLower, AtLower, AtLower];
        let first = entering_arc(&dj1, &dj2, &arcs);
        let second = entering_arc(&dj1, &dj2, &arcs);
        assert_eq!(first, second);
        assert_eq!(first.map(|c| c.arc), Ok(1));
        assert_eq!(dj1, vec![1.0, 2.0, 1.0]);
        assert_eq!(dj2, vec![-1.0, -6.0, -2.0]);
    }
}
