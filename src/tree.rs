//! Resolution trees: the declarative shape a name resolved to.
//!
//! A [`ResolutionTree`] is pure data. It says which endpoint keys back a
//! name and how traffic should divide among them; it holds no connections
//! and no randomness. [`compile`](crate::compile()) turns a tree into the
//! runtime [`Dispatcher`](crate::Dispatcher) graph that actually routes.
//!
//! Two composite shapes exist:
//! - [`ResolutionTree::Alternatives`]: ordered preference. Traffic goes to
//!   the healthiest listed subtree, earliest first on ties.
//! - [`ResolutionTree::Union`]: weighted split. Each call lands on one
//!   subtree drawn in proportion to its weight.
//!
//! Three marker variants say "no endpoints here" for different reasons.
//! Resolvers care about the difference (a [`Negative`](ResolutionTree::Negative)
//! answer can be cached much longer than an
//! [`Unresolvable`](ResolutionTree::Unresolvable) one); dispatch does not,
//! and compiles all three to the same refusal.

/// One weighted branch of a [`ResolutionTree::Union`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Weighted<K> {
    /// Relative draw weight. Weights need not sum to 1; they must be
    /// non-negative and finite, and at least one branch must be positive.
    pub weight: f64,
    /// The subtree receiving this share of traffic.
    pub tree: ResolutionTree<K>,
}

/// The shape a logical name resolved to, parameterized by endpoint key.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResolutionTree<K> {
    /// Resolution succeeded and found nothing.
    Empty,
    /// The name is known not to exist.
    Negative,
    /// Resolution itself failed.
    Unresolvable,
    /// A concrete endpoint key.
    Leaf(K),
    /// Ordered preference across subtrees (failover).
    Alternatives(Vec<ResolutionTree<K>>),
    /// Weighted split across subtrees (load balancing).
    Union(Vec<Weighted<K>>),
}

impl<K> ResolutionTree<K> {
    /// Build an [`Alternatives`](ResolutionTree::Alternatives) from subtrees
    /// in preference order.
    pub fn alt<I>(children: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        ResolutionTree::Alternatives(children.into_iter().collect())
    }

    /// Build a [`Union`](ResolutionTree::Union) from `(weight, subtree)`
    /// pairs.
    pub fn union<I>(branches: I) -> Self
    where
        I: IntoIterator<Item = (f64, Self)>,
    {
        ResolutionTree::Union(
            branches
                .into_iter()
                .map(|(weight, tree)| Weighted { weight, tree })
                .collect(),
        )
    }

    /// Collapse degenerate grouping without changing routing semantics.
    ///
    /// - An empty group becomes [`Negative`](ResolutionTree::Negative).
    /// - A one-child group becomes that child (a one-branch union drops its
    ///   weight; a whole split to one destination is no split).
    ///
    /// Zero-weight branches are kept: they receive no traffic but still
    /// count toward a union's health.
    ///
    /// Simplification is a convenience for tree-producing layers;
    /// [`compile`](crate::compile()) accepts unsimplified trees and handles
    /// the degenerate shapes itself.
    pub fn simplified(self) -> Self {
        match self {
            ResolutionTree::Alternatives(children) => {
                let mut children: Vec<_> =
                    children.into_iter().map(ResolutionTree::simplified).collect();
                match children.len() {
                    0 => ResolutionTree::Negative,
                    1 => children.swap_remove(0),
                    _ => ResolutionTree::Alternatives(children),
                }
            }
            ResolutionTree::Union(branches) => {
                let mut branches: Vec<_> = branches
                    .into_iter()
                    .map(|b| Weighted {
                        weight: b.weight,
                        tree: b.tree.simplified(),
                    })
                    .collect();
                match branches.len() {
                    0 => ResolutionTree::Negative,
                    1 => branches.swap_remove(0).tree,
                    _ => ResolutionTree::Union(branches),
                }
            }
            leaf_or_marker => leaf_or_marker,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Tree = ResolutionTree<&'static str>;

    #[test]
    fn empty_groups_simplify_to_negative() {
        assert_eq!(Tree::alt([]).simplified(), Tree::Negative);
        assert_eq!(Tree::union([]).simplified(), Tree::Negative);
    }

    #[test]
    fn singleton_groups_collapse_to_the_child() {
        let tree = Tree::alt([Tree::Leaf("a")]);
        assert_eq!(tree.simplified(), Tree::Leaf("a"));

        let tree = Tree::union([(3.0, Tree::Leaf("a"))]);
        assert_eq!(tree.simplified(), Tree::Leaf("a"));
    }

    #[test]
    fn collapse_is_recursive() {
        // alt(alt(alt(leaf))) collapses all the way down.
        let tree = Tree::alt([Tree::alt([Tree::alt([Tree::Leaf("a")])])]);
        assert_eq!(tree.simplified(), Tree::Leaf("a"));

        // An inner empty union becomes Negative but the outer pair survives.
        let tree = Tree::alt([Tree::union([]), Tree::Leaf("a")]);
        assert_eq!(
            tree.simplified(),
            Tree::alt([Tree::Negative, Tree::Leaf("a")])
        );
    }

    #[test]
    fn zero_weight_branches_survive_simplification() {
        let tree = Tree::union([(0.0, Tree::Leaf("cold")), (1.0, Tree::Leaf("hot"))]);
        assert_eq!(tree.clone().simplified(), tree);
    }

    #[test]
    fn markers_and_leaves_are_untouched() {
        assert_eq!(Tree::Empty.simplified(), Tree::Empty);
        assert_eq!(Tree::Unresolvable.simplified(), Tree::Unresolvable);
        assert_eq!(Tree::Leaf("a").simplified(), Tree::Leaf("a"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn trees_serialize_as_plain_data() {
        let tree: ResolutionTree<String> = ResolutionTree::union([
            (2.0, ResolutionTree::Leaf("a".to_string())),
            (1.0, ResolutionTree::Empty),
        ]);
        let json = serde_json::to_string(&tree).unwrap();
        let back: ResolutionTree<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }
}
