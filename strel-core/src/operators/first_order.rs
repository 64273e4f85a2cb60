use crate::domains::ValueDomain;
use crate::signal::Signal;

/// Negate every value of the signal, written `!` or `not`.
///
/// For the robustness domain this flips the sign of every value:
///
/// | time | subformula | not  |
/// | ---- | ---------- | ---- |
/// | 0.0  |        1.0 | -1.0 |
/// | 1.0  |        3.0 | -3.0 |
/// | 2.0  |       -2.0 |  2.0 |
pub fn not<D>(domain: &D, signal: &Signal<D::Value>) -> Signal<D::Value>
where
    D: ValueDomain,
{
    signal.map(|value| domain.negation(value))
}

/// Require both signals to hold, written `/\`, `&&` or `and`.
///
/// The output is the conjunction of the two values at every time in the intersection of the two
/// signal domains.
///
/// | time | left | right | and  |
/// | ---- | ---- | ----- | ---- |
/// | 0.0  |  1.0 |  -1.0 | -1.0 |
/// | 1.0  |  3.0 |   2.0 |  2.0 |
/// | 2.0  | -2.0 |   0.0 | -2.0 |
pub fn and<D>(domain: &D, left: &Signal<D::Value>, right: &Signal<D::Value>) -> Signal<D::Value>
where
    D: ValueDomain,
{
    left.merge(right, |l, r| domain.conjunction(l, r))
}

/// Require either signal to hold, written `\/`, `||` or `or`.
pub fn or<D>(domain: &D, left: &Signal<D::Value>, right: &Signal<D::Value>) -> Signal<D::Value>
where
    D: ValueDomain,
{
    left.merge(right, |l, r| domain.disjunction(l, r))
}

/// Require the consequent to hold whenever the antecedent holds, written `->`.
///
/// Computed as `!ante \/ cons`.
pub fn implies<D>(domain: &D, ante: &Signal<D::Value>, cons: &Signal<D::Value>) -> Signal<D::Value>
where
    D: ValueDomain,
{
    ante.merge(cons, |a, c| domain.disjunction(&domain.negation(a), c))
}
