use std::collections::HashMap;
use std::fmt;

use ahash::RandomState;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{EnumCount as EnumCountMacro, EnumIter};

macro_rules! define_rule_ids {
    ($(($variant:ident, $name:literal)),* $(,)?) => {
        /// Identity of an analyzer rule. The position in the table below is the identity; the
        /// name is only used for diagnostics.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumCountMacro)]
        pub enum RuleId {
            $($variant),*
        }

        impl RuleId {
            /// Every rule identity in registration order.
            pub const ALL: &'static [RuleId] = &[$(RuleId::$variant),*];

            pub fn name(self) -> &'static str {
                match self {
                    $(RuleId::$variant => $name),*
                }
            }
        }
    };
}

define_rule_ids! {
    (ApplyDefaultSelectLimit, "applyDefaultSelectLimit"),
    (ValidateOffsetAndLimit, "validateOffsetAndLimit"),
    (ValidateCreateTable, "validateCreateTable"),
    (ValidateExprSem, "validateExprSem"),
    (ResolveVariables, "resolveVariables"),
    (ResolveNamedWindows, "resolveNamedWindows"),
    (ResolveSetVariables, "resolveSetVariables"),
    (ResolveViews, "resolveViews"),
    (LiftCtes, "liftCtes"),
    (ResolveCtes, "resolveCtes"),
    (LiftRecursiveCtes, "liftRecursiveCtes"),
    (ResolveDatabases, "resolveDatabases"),
    (ResolveTables, "resolveTables"),
    (LoadStoredProcedures, "loadStoredProcedures"),
    (ValidateDropTables, "validateDropTables"),
    (SetTargetSchemas, "setTargetSchemas"),
    (ResolveCreateLike, "resolveCreateLike"),
    (ParseColumnDefaults, "parseColumnDefaults"),
    (ResolveDropConstraint, "resolveDropConstraint"),
    (ValidateDropConstraint, "validateDropConstraint"),
    (LoadCheckConstraints, "loadCheckConstraints"),
    (ResolveCreateSelect, "resolveCreateSelect"),
    (ResolveSubqueries, "resolveSubqueries"),
    (SetViewTargetSchema, "setViewTargetSchema"),
    (ResolveUnions, "resolveUnions"),
    (ResolveDescribeQuery, "resolveDescribeQuery"),
    (CheckUniqueTableNames, "checkUniqueTableNames"),
    (ResolveTableFunctions, "resolveTableFunctions"),
    (ResolveDeclarations, "resolveDeclarations"),
    (ResolveColumnDefaults, "resolveColumnDefaults"),
    (ValidateColumnDefaults, "validateColumnDefaults"),
    (ValidateCreateTrigger, "validateCreateTrigger"),
    (ValidateCreateProcedure, "validateCreateProcedure"),
    (LoadInfoSchema, "loadInfoSchema"),
    (ValidateReadOnlyDatabase, "validateReadOnlyDatabase"),
    (ValidateReadOnlyTransaction, "validateReadOnlyTransaction"),
    (ValidateDatabaseSet, "validateDatabaseSet"),
    (ValidatePrivileges, "validatePrivileges"),
    (ReresolveTables, "reresolveTables"),
    (SetInsertColumns, "setInsertColumns"),
    (ValidateJoinComplexity, "validateJoinComplexity"),
    (ResolveNaturalJoins, "resolveNaturalJoins"),
    (ResolveOrderbyLiterals, "resolveOrderbyLiterals"),
    (ResolveFunctions, "resolveFunctions"),
    (FlattenTableAliases, "flattenTableAliases"),
    (PushdownSort, "pushdownSort"),
    (PushdownGroupbyAliases, "pushdownGroupbyAliases"),
    (PushdownSubqueryAliasFilters, "pushdownSubqueryAliasFilters"),
    (QualifyColumns, "qualifyColumns"),
    (ResolveColumns, "resolveColumns"),
    (ValidateCheckConstraint, "validateCheckConstraint"),
    (ResolveBarewordSetVariables, "resolveBarewordSetVariables"),
    (ExpandStars, "expandStars"),
    (TransposeRightJoins, "transposeRightJoins"),
    (ResolveHaving, "resolveHaving"),
    (MergeUnionSchemas, "mergeUnionSchemas"),
    (FlattenAggregationExprs, "flattenAggregationExprs"),
    (ReorderProjection, "reorderProjection"),
    (ResolveSubqueryExprs, "resolveSubqueryExprs"),
    (FinalizeSubqueryExprs, "finalizeSubqueryExprs"),
    (ReplaceCrossJoins, "replaceCrossJoins"),
    (MoveJoinCondsToFilter, "moveJoinCondsToFilter"),
    (EvalFilter, "evalFilter"),
    (OptimizeDistinct, "optimizeDistinct"),
    (FinalizeSubqueries, "finalizeSubqueries"),
    (FinalizeUnions, "finalizeUnions"),
    (LoadTriggers, "loadTriggers"),
    (ProcessTruncate, "processTruncate"),
    (ResolveAlterColumn, "resolveAlterColumn"),
    (ResolveGenerators, "resolveGenerators"),
    (RemoveUnnecessaryConverts, "removeUnnecessaryConverts"),
    (AssignCatalog, "assignCatalog"),
    (PruneColumns, "pruneColumns"),
    (StripTableNameInDefaults, "stripTableNamesFromColumnDefaults"),
    (HoistSelectExists, "hoistSelectExists"),
    (OptimizeJoins, "optimizeJoins"),
    (PushdownFilters, "pushdownFilters"),
    (SubqueryIndexes, "subqueryIndexes"),
    (InSubqueryIndexes, "inSubqueryIndexes"),
    (PruneTables, "pruneTables"),
    (SetJoinScopeLen, "setJoinScopeLen"),
    (EraseProjection, "eraseProjection"),
    (ReplaceSortPk, "replaceSortPk"),
    (InsertTopN, "insertTopN"),
    (CacheSubqueryResults, "cacheSubqueryResults"),
    (CacheSubqueryAliasesInJoins, "cacheSubqueryAliasesInJoins"),
    (ApplyHashLookups, "applyHashLookups"),
    (ApplyHashIn, "applyHashIn"),
    (ResolveInsertRows, "resolveInsertRows"),
    (ResolvePreparedInsert, "resolvePreparedInsert"),
    (ApplyTriggers, "applyTriggers"),
    (ApplyProcedures, "applyProcedures"),
    (AssignRoutines, "assignRoutines"),
    (ModifyUpdateExprsForJoin, "modifyUpdateExprsForJoin"),
    (ApplyRowUpdateAccumulators, "applyRowUpdateAccumulators"),
    (WrapWithRollback, "rollback triggers"),
    (ApplyFKs, "applyFKs"),
    (ValidateResolved, "validateResolved"),
    (ValidateOrderBy, "validateOrderBy"),
    (ValidateGroupBy, "validateGroupBy"),
    (ValidateSchemaSource, "validateSchemaSource"),
    (ValidateIndexCreation, "validateIndexCreation"),
    (ValidateOperands, "validateOperands"),
    (ValidateCaseResultTypes, "validateCaseResultTypes"),
    (ValidateIntervalUsage, "validateIntervalUsage"),
    (ValidateExplodeUsage, "validateExplodeUsage"),
    (ValidateSubqueryColumns, "validateSubqueryColumns"),
    (ValidateUnionSchemasMatch, "validateUnionSchemasMatch"),
    (ValidateAggregations, "validateAggregations"),
    (Autocommit, "addAutocommitNode"),
    (TrackProcess, "trackProcess"),
    (Parallelize, "parallelize"),
    (ClearWarnings, "clearWarnings"),
}

impl RuleId {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<RuleId> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The read-only table of rule identities, built once and shared by every analysis run.
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    ids: Vec<RuleId>,
    by_name: HashMap<&'static str, RuleId, RandomState>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleRegistry {
    /// Builds the registry from the rule table. Panics when identities are not contiguous from
    /// zero or two identities share a name.
    pub fn new() -> Self {
        let ids = RuleId::iter().collect::<Vec<_>>();
        assert_eq!(ids.len(), RuleId::COUNT);
        let mut by_name = HashMap::with_capacity_and_hasher(ids.len(), RandomState::new());
        for (position, id) in ids.iter().enumerate() {
            assert_eq!(id.index(), position, "rule {} is out of order", id);
            let previous = by_name.insert(id.name(), *id);
            assert!(previous.is_none(), "duplicate rule name {}", id.name());
        }
        Self { ids, by_name }
    }

    pub fn name(&self, id: RuleId) -> &'static str {
        id.name()
    }

    pub fn lookup(&self, name: &str) -> Option<RuleId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Rule identities in registration order.
    pub fn iter(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.ids.iter().copied()
    }
}
