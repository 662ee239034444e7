//! Level-wise tree grower.
//!
//! One iteration grows one level of the tree:
//!
//! 1. Route instances to their current leaf (root on the first level).
//! 2. Build histograms: the root directly, deeper levels by building right
//!    children and deriving left children as `parent - right`. Histograms
//!    that cannot yield a split are pruned.
//! 3. Search every surviving `(node, feature)` histogram for the best split
//!    per node.
//! 4. Stop if no node has a candidate, if splitting all of them would exceed
//!    the leaf budget, or if the depth or leaf budget is already reached.
//! 5. Otherwise split every candidate node and move to the next level.
//!
//! Levels are strict barriers: level `d + 1` needs level `d`'s splits and
//! histograms, and nothing else is carried between levels.

use std::collections::BTreeMap;
use std::ops::ControlFlow;

use crate::data::InstanceStore;
use crate::runtime::Partitioned;
use crate::training::checkpoint::{Checkpointer, PeriodicCheckpointer};
use crate::training::config::{BoostConfig, TreeConfig};
use crate::training::logger::{TrainingLogger, Verbosity};
use crate::training::TrainError;

use super::histograms::{build_histograms, prune_histograms, subtract_histograms, FeatureKey, Histogram};
use super::partition::PairPartitioner;
use super::router::assign;
use super::split::{find_splits, level_seed, SplitCandidate, SplitEvaluator, SplitFinderParams};
use super::tree::{first_at_depth, right_child, GrowthTree, NodeId, ROOT};

type HistogramSet = Partitioned<(FeatureKey, Histogram)>;

// =============================================================================
// Parameters
// =============================================================================

/// Parameters for growing one tree.
#[derive(Clone, Debug, PartialEq)]
pub struct GrowerParams {
    pub max_depth: u32,
    pub max_leaves: u32,
    /// Histograms with less than twice this hessian mass are pruned.
    pub min_node_hess: f64,
    pub col_sample_rate: f64,
    pub seed: u64,
    /// Mixed into the per-level sampling seed.
    pub tree_index: u32,
    pub checkpoint_interval: i32,
    pub aggregation_depth: u32,
    /// Number of shuffle partitions.
    pub parallelism: usize,
}

impl Default for GrowerParams {
    fn default() -> Self {
        Self::from_configs(&BoostConfig::default(), &TreeConfig::default())
    }
}

impl GrowerParams {
    pub fn from_configs(boost: &BoostConfig, tree: &TreeConfig) -> Self {
        Self {
            max_depth: boost.max_depth,
            max_leaves: boost.max_leaves,
            min_node_hess: boost.min_node_hess,
            col_sample_rate: boost.col_sample_by_level,
            seed: boost.seed,
            tree_index: tree.tree_index,
            checkpoint_interval: boost.checkpoint_interval,
            aggregation_depth: boost.aggregation_depth,
            parallelism: boost.parallelism,
        }
    }
}

// =============================================================================
// Outputs
// =============================================================================

/// Why growth stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// No frontier node admits a valid split.
    NoCandidates,
    /// The leaf budget is reached or would be exceeded.
    LeafBudget,
    /// The frontier is at the maximum depth.
    DepthBudget,
    /// The caller stopped growth at a level boundary.
    Cancelled,
}

/// Counters collected while growing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GrowthStats {
    /// Levels whose splits were applied.
    pub levels: u32,
    /// Histograms handed to the split evaluator.
    pub trials: u64,
    /// Histograms aggregated directly from instances.
    pub histograms_built: usize,
    /// Left-child histograms derived by subtraction.
    pub histograms_derived: usize,
    /// Histograms dropped before the split search.
    pub histograms_pruned: usize,
    /// Checkpoints written (assignments and histograms).
    pub checkpoints: u64,
    /// Leaf count after each iteration, starting with the root.
    pub leaf_counts: Vec<u32>,
    pub stop_reason: Option<StopReason>,
}

/// A finished growth tree and how it was grown.
#[derive(Clone, Debug)]
pub struct GrownTree {
    pub tree: GrowthTree,
    pub stats: GrowthStats,
}

// =============================================================================
// Grower
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GrowerState {
    Growing,
    Finished(StopReason),
}

/// Level-wise histogram tree grower.
pub struct TreeGrower<'a, E: SplitEvaluator + ?Sized> {
    params: GrowerParams,
    evaluator: &'a E,
    logger: TrainingLogger,
}

impl<'a, E: SplitEvaluator + ?Sized> TreeGrower<'a, E> {
    pub fn new(params: GrowerParams, evaluator: &'a E, logger: TrainingLogger) -> Self {
        Self {
            params,
            evaluator,
            logger,
        }
    }

    /// Grow a tree until a stopping rule fires.
    pub fn grow(&self, store: &InstanceStore) -> Result<GrownTree, TrainError> {
        self.grow_with(store, |_, _| ControlFlow::Continue(()))
    }

    /// Grow a tree, calling `on_level(tree, depth)` before each level.
    ///
    /// Returning `ControlFlow::Break` stops growth with
    /// [`StopReason::Cancelled`]; the tree grown so far is returned.
    pub fn grow_with<F>(&self, store: &InstanceStore, mut on_level: F) -> Result<GrownTree, TrainError>
    where
        F: FnMut(&GrowthTree, u32) -> ControlFlow<()>,
    {
        let params = &self.params;
        let num_features = store.num_features();

        let (total_grad, total_hess) = store.gradient_sums();
        let mut tree = GrowthTree::new(self.evaluator.leaf_weight(total_grad, total_hess));
        let mut stats = GrowthStats {
            leaf_counts: vec![1],
            ..Default::default()
        };

        let mut assignment_ckpt = PeriodicCheckpointer::new(params.checkpoint_interval);
        let mut histogram_ckpt = PeriodicCheckpointer::new(params.checkpoint_interval);

        let mut depth = 0u32;
        let mut min_node: NodeId = ROOT;
        let mut leaf_count: u32 = 1;
        let mut last_splits: BTreeMap<NodeId, SplitCandidate> = BTreeMap::new();
        let mut assignment: Option<Partitioned<NodeId>> = None;
        let mut parent_hists: Option<HistogramSet> = None;
        let mut state = GrowerState::Growing;

        while state == GrowerState::Growing {
            if on_level(&tree, depth).is_break() {
                state = GrowerState::Finished(StopReason::Cancelled);
                continue;
            }

            // Budgets that do not depend on this level's candidates.
            if depth >= params.max_depth {
                state = GrowerState::Finished(StopReason::DepthBudget);
                continue;
            }
            if leaf_count >= params.max_leaves {
                state = GrowerState::Finished(StopReason::LeafBudget);
                continue;
            }

            // 1. Route instances.
            let routed = assign(store, assignment.as_ref(), &last_splits);
            assignment_ckpt.update(&routed);
            let routed = assignment.insert(routed);

            // 2. Histograms for this level's frontier.
            let hists = match parent_hists.take() {
                None => {
                    let partitioner = PairPartitioner::hash(params.parallelism);
                    let built = build_histograms(store, routed, min_node, &partitioner);
                    stats.histograms_built += built.len();
                    built
                }
                Some(parents) => {
                    let right_frontier: Vec<NodeId> = last_splits.keys().map(|&p| right_child(p)).collect();
                    let split_parents: Vec<NodeId> = last_splits.keys().copied().collect();

                    let build_partitioner = PairPartitioner::range(&right_frontier, num_features, params.parallelism);
                    let right = build_histograms(store, routed, min_node, &build_partitioner);
                    stats.histograms_built += right.len();

                    let join_partitioner = PairPartitioner::range(&split_parents, num_features, params.parallelism);
                    let both = subtract_histograms(parents, right, &join_partitioner)?;
                    stats.histograms_derived += both.len() / 2;
                    both
                }
            };
            let (hists, pruned) = prune_histograms(hists, params.min_node_hess);
            stats.histograms_pruned += pruned;
            histogram_ckpt.update(&hists);

            // 3. Best split per frontier node.
            let search = find_splits(
                &hists,
                self.evaluator,
                &SplitFinderParams {
                    col_sample_rate: params.col_sample_rate,
                    seed: level_seed(params.seed, params.tree_index, depth),
                    aggregation_depth: params.aggregation_depth,
                },
            );
            stats.trials += search.trials;

            if self.logger.enabled(Verbosity::Debug) {
                self.logger.debug(format_args!(
                    "level {depth}: frontier {} leaves, {} histograms after pruning ({pruned} pruned), {} candidates",
                    tree.leaf_ids().into_iter().filter(|&id| id >= min_node).count(),
                    hists.len(),
                    search.len(),
                ));
            }

            // 4. Candidate-dependent stopping rules.
            let n_splits = search.len() as u32;
            if n_splits == 0 {
                state = GrowerState::Finished(StopReason::NoCandidates);
                continue;
            }
            if leaf_count + n_splits > params.max_leaves {
                state = GrowerState::Finished(StopReason::LeafBudget);
                continue;
            }

            // 5. Apply every split.
            for (&node, split) in &search.splits {
                tree.apply_split(node, split.clone())?;
            }
            leaf_count += n_splits;
            stats.levels += 1;
            stats.leaf_counts.push(leaf_count);

            depth += 1;
            min_node = first_at_depth(depth);
            last_splits = search.splits;
            parent_hists = Some(hists);
        }

        assignment_ckpt.delete_all();
        assignment_ckpt.unpersist();
        histogram_ckpt.delete_all();
        histogram_ckpt.unpersist();
        stats.checkpoints = assignment_ckpt.total_checkpoints() + histogram_ckpt.total_checkpoints();

        if let GrowerState::Finished(reason) = state {
            stats.stop_reason = Some(reason);
            self.logger.info(format_args!(
                "tree {} finished: {:?} after {} levels, {} leaves",
                params.tree_index,
                reason,
                stats.levels,
                tree.num_leaves()
            ));
        }

        Ok(GrownTree { tree, stats })
    }
}
