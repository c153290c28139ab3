//! Lazy evaluation decorator for groups and bilinear groups.
//!
//! Operations on a [`LazyGroup`] only record an expression node. The value is
//! computed the first time it is needed (comparison, hashing, serialization,
//! [`LazyGroup::force`]) and memoized in the node, which then releases its
//! operands. A chain of products, inverses and powers over a commutative group
//! is flattened into a single multi-exponentiation, so `(a^x * b^y)^z * c`
//! costs one interleaved square-and-multiply instead of three
//! exponentiations. Shared subexpressions are visited once.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, PoisonError};

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use once_cell::sync::OnceCell;
use rand_core::RngCore;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{instrument, trace, warn};

use super::{BilinearGroup, BilinearMap, HashIntoGroup, PairingType};
use crate::arith::{multiexp, Element, Group};
use crate::errors::{Error, RepresentationError};
use crate::repr::{Repr, ReprObject, Representable, Restore, StandaloneRepresentable};

#[derive(Clone)]
enum Expr {
    Op(LazyElement, LazyElement),
    Inverse(LazyElement),
    Pow(LazyElement, BigInt),
    Pair(Arc<dyn BilinearMap>, LazyElement, LazyElement),
}

impl Expr {
    fn kind(&self) -> &'static str {
        match self {
            Expr::Op(..) => "op",
            Expr::Inverse(_) => "inverse",
            Expr::Pow(..) => "pow",
            Expr::Pair(..) => "pair",
        }
    }

    fn operands(&self) -> Vec<&LazyElement> {
        match self {
            Expr::Op(a, b) | Expr::Pair(_, a, b) => vec![a, b],
            Expr::Inverse(a) | Expr::Pow(a, _) => vec![a],
        }
    }

    fn into_operands(self) -> Vec<LazyElement> {
        match self {
            Expr::Op(a, b) | Expr::Pair(_, a, b) => vec![a, b],
            Expr::Inverse(a) | Expr::Pow(a, _) => vec![a],
        }
    }
}

/// `expr` is `None` for leaves and for nodes whose value has been computed.
struct LazyNode {
    group: Arc<dyn Group>,
    expr: Mutex<Option<Expr>>,
    value: OnceCell<Element>,
}

impl LazyNode {
    fn take_expr(&mut self) -> Option<Expr> {
        self.expr
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Unlinks uniquely owned operands iteratively so that dropping a long chain
/// does not recurse once per node.
impl Drop for LazyNode {
    fn drop(&mut self) {
        let mut stack: Vec<LazyElement> = match self.take_expr() {
            Some(expr) => expr.into_operands(),
            None => return,
        };
        while let Some(child) = stack.pop() {
            if let Some(mut node) = Arc::into_inner(child.0) {
                if let Some(expr) = node.take_expr() {
                    stack.extend(expr.into_operands());
                }
            }
        }
    }
}

enum State {
    Forced(Element),
    Pending(Expr),
}

/// Deferred element of a [`LazyGroup`].
///
/// Equality and hashing force both operands and compare the underlying
/// values; an element that fails to evaluate equals nothing.
#[derive(Clone)]
pub struct LazyElement(Arc<LazyNode>);

impl LazyElement {
    fn node(group: Arc<dyn Group>, expr: Expr) -> Self {
        LazyElement(Arc::new(LazyNode {
            group,
            expr: Mutex::new(Some(expr)),
            value: OnceCell::new(),
        }))
    }

    fn leaf(group: Arc<dyn Group>, value: Element) -> Self {
        LazyElement(Arc::new(LazyNode {
            group,
            expr: Mutex::new(None),
            value: OnceCell::with_value(value),
        }))
    }

    fn key(&self) -> *const LazyNode {
        Arc::as_ptr(&self.0)
    }

    /// Whether the value has been computed already.
    pub fn is_forced(&self) -> bool {
        self.0.value.get().is_some()
    }

    /// Computes the value once; later calls, from any thread, return the
    /// memoized result.
    pub fn force(&self) -> Result<Element, Error> {
        if let Some(value) = self.0.value.get() {
            return Ok(value.clone());
        }
        let value = self.0.value.get_or_try_init(|| self.evaluate())?.clone();
        let released = self
            .0
            .expr
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(released);
        Ok(value)
    }

    fn state(&self) -> Result<State, Error> {
        if let Some(value) = self.0.value.get() {
            return Ok(State::Forced(value.clone()));
        }
        let expr = self
            .0
            .expr
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match (expr, self.0.value.get()) {
            (Some(expr), _) => Ok(State::Pending(expr)),
            (None, Some(value)) => Ok(State::Forced(value.clone())),
            (None, None) => Err(Error::Math("lazy node has neither value nor expression")),
        }
    }

    fn evaluate(&self) -> Result<Element, Error> {
        let expr = match self.state()? {
            State::Forced(value) => return Ok(value),
            State::Pending(expr) => expr,
        };
        match expr {
            Expr::Pair(..) => {
                trace!("evaluating deferred pairing");
                self.combine(&expr)
            }
            _ if self.0.group.is_commutative() => {
                let terms = self.collect_terms(expr)?;
                trace!(terms = terms.len(), "evaluating flattened product");
                multiexp(self.0.group.as_ref(), &terms)
            }
            _ => self.evaluate_stepwise(expr),
        }
    }

    /// Applies `expr` to the values of its operands, which must be cheap to
    /// force.
    fn combine(&self, expr: &Expr) -> Result<Element, Error> {
        let group = &self.0.group;
        match expr {
            Expr::Op(a, b) => group.op(&a.force()?, &b.force()?),
            Expr::Inverse(a) => group.inverse(&a.force()?),
            Expr::Pow(a, k) => group.pow(&a.force()?, k),
            Expr::Pair(map, a, b) => map.apply(&a.force()?, &b.force()?),
        }
    }

    /// Forces the operands bottom-up with an explicit stack, memoizing every
    /// intermediate node, then combines them. Used when the group law does
    /// not commute and products cannot be reordered.
    fn evaluate_stepwise(&self, expr: Expr) -> Result<Element, Error> {
        let mut stack: Vec<LazyElement> = expr.operands().into_iter().cloned().collect();
        while let Some(node) = stack.pop() {
            let inner = match node.state()? {
                State::Forced(_) => continue,
                State::Pending(inner) => inner,
            };
            let waiting: Vec<LazyElement> = inner
                .operands()
                .into_iter()
                .filter(|operand| !operand.is_forced())
                .cloned()
                .collect();
            if waiting.is_empty() || matches!(inner, Expr::Pair(..)) {
                node.force()?;
            } else {
                stack.push(node);
                stack.extend(waiting);
            }
        }
        self.combine(&expr)
    }

    /// Rewrites the product DAG below this node as `prod base_i^{k_i}`, with
    /// equal bases merged. Leaves, pairings and already forced nodes become
    /// bases. Exponents are pushed down in topological order so that a node
    /// shared by many parents is expanded once with its summed multiplicity.
    fn collect_terms(&self, expr: Expr) -> Result<Vec<(Element, BigInt)>, Error> {
        let root = self.key();
        let mut exprs: HashMap<*const LazyNode, Expr> = HashMap::from([(root, expr)]);
        let mut bases: HashMap<*const LazyNode, LazyElement> = HashMap::new();
        let mut parents: HashMap<*const LazyNode, usize> = HashMap::new();

        let mut discover = vec![root];
        while let Some(key) = discover.pop() {
            let children: Vec<LazyElement> = match exprs.get(&key) {
                Some(expr) => expr.operands().into_iter().cloned().collect(),
                None => continue,
            };
            for child in children {
                let child_key = child.key();
                *parents.entry(child_key).or_default() += 1;
                if exprs.contains_key(&child_key) || bases.contains_key(&child_key) {
                    continue;
                }
                match child.state()? {
                    State::Pending(inner) if !matches!(inner, Expr::Pair(..)) => {
                        exprs.insert(child_key, inner);
                        discover.push(child_key);
                    }
                    _ => {
                        bases.insert(child_key, child);
                    }
                }
            }
        }

        let mut exponents: HashMap<*const LazyNode, BigInt> = HashMap::from([(root, BigInt::one())]);
        let mut terms: Vec<(Element, BigInt)> = Vec::new();
        let mut positions: HashMap<Element, usize> = HashMap::new();
        let mut ready = vec![root];

        while let Some(key) = ready.pop() {
            let exponent = exponents.remove(&key).unwrap_or_default();
            let contributions = match exprs.remove(&key) {
                Some(Expr::Op(a, b)) => vec![(a, exponent.clone()), (b, exponent)],
                Some(Expr::Inverse(a)) => vec![(a, -exponent)],
                Some(Expr::Pow(a, k)) => vec![(a, exponent * k)],
                Some(Expr::Pair(..)) | None => Vec::new(),
            };
            for (child, contribution) in contributions {
                let child_key = child.key();
                *exponents.entry(child_key).or_default() += contribution;
                let Some(remaining) = parents.get_mut(&child_key) else {
                    continue;
                };
                *remaining -= 1;
                if *remaining > 0 {
                    continue;
                }
                if exprs.contains_key(&child_key) {
                    ready.push(child_key);
                    continue;
                }
                let exponent = exponents.remove(&child_key).unwrap_or_default();
                if exponent.is_zero() {
                    continue;
                }
                let base = child.force()?;
                match positions.get(&base) {
                    Some(&i) => terms[i].1 += exponent,
                    None => {
                        positions.insert(base.clone(), terms.len());
                        terms.push((base, exponent));
                    }
                }
            }
        }
        Ok(terms)
    }
}

impl PartialEq for LazyElement {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        match (self.force(), other.force()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for LazyElement {}

impl Hash for LazyElement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if let Ok(value) = self.force() {
            value.hash(state);
        }
    }
}

impl fmt::Debug for LazyElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self
            .0
            .expr
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or("value", Expr::kind);
        f.debug_struct("LazyElement")
            .field("kind", &kind)
            .field("value", &self.0.value.get())
            .finish()
    }
}

impl Representable for LazyElement {
    fn to_repr(&self) -> Repr {
        match self.force() {
            Ok(value) => value.to_repr(),
            Err(err) => {
                warn!(%err, "failed to evaluate lazy element for serialization");
                Repr::Null
            }
        }
    }
}

/// Forces many lazy elements in parallel and returns their values. Elements
/// that are not lazy are returned unchanged.
#[instrument(level = "info", skip_all, fields(len = elements.len()))]
pub fn force_all(elements: &[Element]) -> Result<Vec<Element>, Error> {
    elements
        .par_iter()
        .map(|element| match element.downcast_ref::<LazyElement>() {
            Some(lazy) => lazy.force(),
            None => Ok(element.clone()),
        })
        .collect()
}

/// Group decorator that defers every operation.
#[derive(Debug)]
pub struct LazyGroup {
    base: Arc<dyn Group>,
}

impl LazyGroup {
    pub fn new(base: Arc<dyn Group>) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &Arc<dyn Group> {
        &self.base
    }

    /// Lifts an element of the base group.
    pub fn wrap(&self, a: &Element) -> Result<Element, Error> {
        if !self.base.contains(a) {
            return Err(Error::ForeignElement("lazy-group"));
        }
        Ok(self.leaf(a.clone()))
    }

    /// The base-group value of `a`, computing it if necessary.
    pub fn force(&self, a: &Element) -> Result<Element, Error> {
        self.lift(a)?.force()
    }

    fn leaf(&self, value: Element) -> Element {
        Element::new(LazyElement::leaf(self.base.clone(), value))
    }

    fn defer(&self, expr: Expr) -> Element {
        Element::new(LazyElement::node(self.base.clone(), expr))
    }

    fn owns(&self, lazy: &LazyElement) -> bool {
        Arc::ptr_eq(&lazy.0.group, &self.base) || *lazy.0.group == *self.base
    }

    /// Accepts lazy elements over the same base group and plain base elements.
    fn lift(&self, a: &Element) -> Result<LazyElement, Error> {
        match a.downcast_ref::<LazyElement>() {
            Some(lazy) if self.owns(lazy) => Ok(lazy.clone()),
            Some(_) => Err(Error::ForeignElement("lazy-group")),
            None if self.base.contains(a) => Ok(LazyElement::leaf(self.base.clone(), a.clone())),
            None => Err(Error::ForeignElement("lazy-group")),
        }
    }
}

impl Representable for LazyGroup {
    fn to_repr(&self) -> Repr {
        ReprObject::new().with("base", &self.base).into()
    }
}

impl Restore for LazyGroup {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        let object = repr.as_object()?;
        object.deny_unknown(&["base"])?;
        Ok(Self::new(object.field("base")?))
    }
}

impl StandaloneRepresentable for LazyGroup {
    fn type_name(&self) -> &'static str {
        "lazy-group"
    }
}

impl Group for LazyGroup {
    fn identity(&self) -> Element {
        self.leaf(self.base.identity())
    }

    fn op(&self, a: &Element, b: &Element) -> Result<Element, Error> {
        Ok(self.defer(Expr::Op(self.lift(a)?, self.lift(b)?)))
    }

    fn inverse(&self, a: &Element) -> Result<Element, Error> {
        Ok(self.defer(Expr::Inverse(self.lift(a)?)))
    }

    fn pow(&self, a: &Element, exponent: &BigInt) -> Result<Element, Error> {
        Ok(self.defer(Expr::Pow(self.lift(a)?, exponent.clone())))
    }

    fn size(&self) -> Option<BigUint> {
        self.base.size()
    }

    fn generator(&self) -> Result<Element, Error> {
        Ok(self.leaf(self.base.generator()?))
    }

    fn is_commutative(&self) -> bool {
        self.base.is_commutative()
    }

    fn contains(&self, a: &Element) -> bool {
        self.lift(a).is_ok()
    }

    fn restore_element(&self, repr: &Repr) -> Result<Element, Error> {
        Ok(self.leaf(self.base.restore_element(repr)?))
    }

    fn random(&self, rng: &mut dyn RngCore) -> Result<Element, Error> {
        Ok(self.leaf(self.base.random(rng)?))
    }
}

/// Records pairings as deferred `GT` elements.
#[derive(Debug)]
struct LazyBilinearMap {
    base: Arc<dyn BilinearMap>,
    g1: Arc<LazyGroup>,
    g2: Arc<LazyGroup>,
    gt: Arc<LazyGroup>,
}

impl BilinearMap for LazyBilinearMap {
    fn apply(&self, g1: &Element, g2: &Element) -> Result<Element, Error> {
        let expr = Expr::Pair(self.base.clone(), self.g1.lift(g1)?, self.g2.lift(g2)?);
        Ok(self.gt.defer(expr))
    }
}

#[derive(Debug)]
struct LazyHash {
    base: Arc<dyn HashIntoGroup>,
    group: Arc<LazyGroup>,
}

impl HashIntoGroup for LazyHash {
    fn hash_into(&self, data: &[u8]) -> Result<Element, Error> {
        Ok(self.group.leaf(self.base.hash_into(data)?))
    }
}

/// Bilinear group whose groups and map are [`LazyGroup`]s over the wrapped
/// group's.
#[derive(Debug)]
pub struct LazyBilinearGroup {
    base: Arc<dyn BilinearGroup>,
    map: Arc<LazyBilinearMap>,
}

impl LazyBilinearGroup {
    pub fn new(base: Arc<dyn BilinearGroup>) -> Self {
        let map = Arc::new(LazyBilinearMap {
            base: base.bilinear_map(),
            g1: Arc::new(LazyGroup::new(base.g1())),
            g2: Arc::new(LazyGroup::new(base.g2())),
            gt: Arc::new(LazyGroup::new(base.gt())),
        });
        Self { base, map }
    }

    pub fn base(&self) -> &Arc<dyn BilinearGroup> {
        &self.base
    }

    fn lazy_hash(
        &self,
        base: Result<Arc<dyn HashIntoGroup>, Error>,
        group: &Arc<LazyGroup>,
    ) -> Result<Arc<dyn HashIntoGroup>, Error> {
        Ok(Arc::new(LazyHash {
            base: base?,
            group: group.clone(),
        }))
    }
}

impl Representable for LazyBilinearGroup {
    fn to_repr(&self) -> Repr {
        ReprObject::new().with("base", &self.base).into()
    }
}

impl Restore for LazyBilinearGroup {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        let object = repr.as_object()?;
        object.deny_unknown(&["base"])?;
        Ok(Self::new(object.field("base")?))
    }
}

impl StandaloneRepresentable for LazyBilinearGroup {
    fn type_name(&self) -> &'static str {
        "lazy-bilinear-group"
    }
}

impl BilinearGroup for LazyBilinearGroup {
    fn pairing_type(&self) -> PairingType {
        self.base.pairing_type()
    }

    fn g1(&self) -> Arc<dyn Group> {
        self.map.g1.clone()
    }

    fn g2(&self) -> Arc<dyn Group> {
        self.map.g2.clone()
    }

    fn gt(&self) -> Arc<dyn Group> {
        self.map.gt.clone()
    }

    fn bilinear_map(&self) -> Arc<dyn BilinearMap> {
        self.map.clone()
    }

    fn hash_into_g1(&self) -> Result<Arc<dyn HashIntoGroup>, Error> {
        self.lazy_hash(self.base.hash_into_g1(), &self.map.g1)
    }

    fn hash_into_g2(&self) -> Result<Arc<dyn HashIntoGroup>, Error> {
        self.lazy_hash(self.base.hash_into_g2(), &self.map.g2)
    }

    fn hash_into_gt(&self) -> Result<Arc<dyn HashIntoGroup>, Error> {
        self.lazy_hash(self.base.hash_into_gt(), &self.map.gt)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::arith::{DebugBilinearGroup, RingGroup, Zp};

    /// Unit group of `F_1009` counting applications of the group law.
    #[derive(Debug)]
    struct CountingGroup {
        inner: RingGroup,
        ops: AtomicUsize,
        commutative: bool,
    }

    impl CountingGroup {
        fn new() -> Arc<Self> {
            Self::with_commutativity(true)
        }

        /// Same law, but reported as non-commutative so products are not
        /// reordered.
        fn non_commutative() -> Arc<Self> {
            Self::with_commutativity(false)
        }

        fn with_commutativity(commutative: bool) -> Arc<Self> {
            let field = Arc::new(Zp::new(BigUint::from(1009u32)).unwrap());
            Arc::new(Self {
                inner: RingGroup::unit(field),
                ops: AtomicUsize::new(0),
                commutative,
            })
        }

        fn ops(&self) -> usize {
            self.ops.load(Ordering::SeqCst)
        }
    }

    impl Representable for CountingGroup {
        fn to_repr(&self) -> Repr {
            self.inner.to_repr()
        }
    }

    impl StandaloneRepresentable for CountingGroup {
        fn type_name(&self) -> &'static str {
            "counting-group"
        }
    }

    impl Group for CountingGroup {
        fn identity(&self) -> Element {
            self.inner.identity()
        }

        fn op(&self, a: &Element, b: &Element) -> Result<Element, Error> {
            self.ops.fetch_add(1, Ordering::SeqCst);
            self.inner.op(a, b)
        }

        fn inverse(&self, a: &Element) -> Result<Element, Error> {
            self.inner.inverse(a)
        }

        fn size(&self) -> Option<BigUint> {
            self.inner.size()
        }

        fn is_commutative(&self) -> bool {
            self.commutative
        }

        fn contains(&self, a: &Element) -> bool {
            self.inner.contains(a)
        }

        fn restore_element(&self, repr: &Repr) -> Result<Element, Error> {
            self.inner.restore_element(repr)
        }

        fn random(&self, rng: &mut dyn RngCore) -> Result<Element, Error> {
            self.inner.random(rng)
        }
    }

    fn sample(group: &dyn Group, rng: &mut StdRng, n: usize) -> Vec<Element> {
        (0..n).map(|_| group.random(rng).unwrap()).collect()
    }

    #[test]
    fn lazy_matches_eager() {
        let base = CountingGroup::new();
        let lazy = LazyGroup::new(base.clone());
        let mut rng = StdRng::seed_from_u64(11);
        let values = sample(base.as_ref(), &mut rng, 3);
        let (a, b, c) = (&values[0], &values[1], &values[2]);

        let eager = {
            let a3 = base.pow(a, &BigInt::from(3)).unwrap();
            let b5 = base.pow(b, &BigInt::from(5)).unwrap();
            let ab = base.op(&a3, &b5).unwrap();
            let squared = base.pow(&ab, &BigInt::from(2)).unwrap();
            base.op(&squared, &base.inverse(c).unwrap()).unwrap()
        };

        let (la, lb, lc) = (lazy.wrap(a).unwrap(), lazy.wrap(b).unwrap(), lazy.wrap(c).unwrap());
        let ab = lazy
            .op(
                &lazy.pow(&la, &BigInt::from(3)).unwrap(),
                &lazy.pow(&lb, &BigInt::from(5)).unwrap(),
            )
            .unwrap();
        let result = lazy
            .op(&lazy.pow(&ab, &BigInt::from(2)).unwrap(), &lazy.inverse(&lc).unwrap())
            .unwrap();

        assert_eq!(lazy.force(&result).unwrap(), eager);
        assert_eq!(result, lazy.wrap(&eager).unwrap());
        assert_eq!(result.to_repr(), eager.to_repr());
    }

    #[test]
    fn operations_are_deferred_and_memoized() {
        let base = CountingGroup::new();
        let lazy = LazyGroup::new(base.clone());
        let mut rng = StdRng::seed_from_u64(12);
        let a = lazy.random(&mut rng).unwrap();
        let b = lazy.random(&mut rng).unwrap();

        let product = lazy.pow(&lazy.op(&a, &b).unwrap(), &BigInt::from(1000)).unwrap();
        assert_eq!(base.ops(), 0);
        assert!(!product.downcast_ref::<LazyElement>().unwrap().is_forced());

        let first = lazy.force(&product).unwrap();
        let after_first = base.ops();
        assert!(after_first > 0);
        assert_eq!(lazy.force(&product).unwrap(), first);
        assert_eq!(base.ops(), after_first);
        assert!(product.downcast_ref::<LazyElement>().unwrap().is_forced());
    }

    #[test]
    fn concurrent_forcing_computes_once() {
        let base = CountingGroup::new();
        let lazy = LazyGroup::new(base.clone());
        let mut rng = StdRng::seed_from_u64(13);
        let a = lazy.random(&mut rng).unwrap();
        let x = lazy.pow(&a, &BigInt::from(123456789)).unwrap();

        let reference = {
            let fresh = CountingGroup::new();
            let inner = lazy.force(&a).unwrap();
            fresh.pow(&inner, &BigInt::from(123456789)).unwrap();
            fresh.ops()
        };

        let batch = vec![x.clone(); 16];
        let values = force_all(&batch).unwrap();
        assert!(values.iter().all(|v| *v == values[0]));
        assert_eq!(base.ops(), reference);
    }

    fn squaring_chain(lazy: &LazyGroup, start: &Element, depth: usize) -> Element {
        (0..depth).fold(start.clone(), |x, _| lazy.op(&x, &x).unwrap())
    }

    #[test]
    fn shared_subexpressions_are_expanded_once() {
        let base = CountingGroup::new();
        let lazy = LazyGroup::new(base.clone());
        let mut rng = StdRng::seed_from_u64(14);
        let a = lazy.random(&mut rng).unwrap();
        let x = squaring_chain(&lazy, &a, 64);

        let value = lazy.force(&x).unwrap();
        let eager = base
            .inner
            .pow(&lazy.force(&a).unwrap(), &(BigInt::one() << 64))
            .unwrap();
        assert_eq!(value, eager);
        // 2^64 takes 65 squarings and one multiplication.
        assert_eq!(base.ops(), 66);
    }

    #[test]
    fn shared_subexpressions_are_forced_once_without_reordering() {
        let base = CountingGroup::non_commutative();
        let lazy = LazyGroup::new(base.clone());
        let mut rng = StdRng::seed_from_u64(15);
        let a = lazy.random(&mut rng).unwrap();
        let b = lazy.random(&mut rng).unwrap();
        let x = squaring_chain(&lazy, &a, 64);
        let y = lazy.op(&x, &b).unwrap();

        let expected = base
            .inner
            .op(
                &base
                    .inner
                    .pow(&lazy.force(&a).unwrap(), &(BigInt::one() << 64))
                    .unwrap(),
                &lazy.force(&b).unwrap(),
            )
            .unwrap();
        assert_eq!(lazy.force(&y).unwrap(), expected);
        assert_eq!(base.ops(), 65);
        assert!(x.downcast_ref::<LazyElement>().unwrap().is_forced());
    }

    #[test]
    fn forcing_releases_operands() {
        let lazy = LazyGroup::new(CountingGroup::new());
        let mut rng = StdRng::seed_from_u64(16);
        let a = lazy.random(&mut rng).unwrap();
        let node = a.downcast_ref::<LazyElement>().unwrap().clone();
        let product = lazy.op(&a, &a).unwrap();
        assert_eq!(Arc::strong_count(&node.0), 4);

        lazy.force(&product).unwrap();
        assert_eq!(Arc::strong_count(&node.0), 2);
        let squared = lazy.pow(&a, &BigInt::from(2)).unwrap();
        assert_eq!(lazy.force(&product).unwrap(), lazy.force(&squared).unwrap());
    }

    #[test]
    fn deep_chains_force_and_drop() {
        const STEPS: u64 = 200_000;
        for base in [CountingGroup::new(), CountingGroup::non_commutative()] {
            let lazy = LazyGroup::new(base.clone());
            let mut rng = StdRng::seed_from_u64(17);
            let a = lazy.random(&mut rng).unwrap();

            let unforced = (0..STEPS).fold(a.clone(), |acc, _| lazy.op(&acc, &a).unwrap());
            drop(unforced);

            let acc = (0..STEPS).fold(a.clone(), |acc, _| lazy.op(&acc, &a).unwrap());
            let expected = base
                .inner
                .pow(&lazy.force(&a).unwrap(), &BigInt::from(STEPS + 1))
                .unwrap();
            assert_eq!(lazy.force(&acc).unwrap(), expected);
            drop(acc);
        }
    }

    #[test]
    fn foreign_elements_are_rejected() {
        let lazy = LazyGroup::new(CountingGroup::new());
        let other = LazyGroup::new(Arc::new(RingGroup::additive(Arc::new(
            Zp::new(BigUint::from(13u32)).unwrap(),
        ))));
        let stray = other.generator().unwrap();
        assert!(!lazy.contains(&stray));
        assert!(matches!(lazy.op(&stray, &stray), Err(Error::ForeignElement(_))));
    }

    #[test]
    fn lazy_bilinear_group_defers_pairings() {
        let base: Arc<dyn BilinearGroup> =
            Arc::new(DebugBilinearGroup::new(128, PairingType::Type3, 2).unwrap());
        let bg = LazyBilinearGroup::new(base.clone());
        let (g1, g2, gt) = (bg.g1(), bg.g2(), bg.gt());
        let e = bg.bilinear_map();
        let p = g1.generator().unwrap();
        let q = bg.hash_into_g2().unwrap().hash_into(b"q").unwrap();

        let (x, y) = (BigInt::from(21), BigInt::from(-8));
        let lhs = e.apply(&g1.pow(&p, &x).unwrap(), &g2.pow(&q, &y).unwrap()).unwrap();
        let rhs = gt.pow(&e.apply(&p, &q).unwrap(), &(&x * &y)).unwrap();
        assert_eq!(lhs, rhs);

        let eager_q = base.hash_into_g2().unwrap().hash_into(b"q").unwrap();
        let eager = base.bilinear_map().apply(&base.g1().generator().unwrap(), &eager_q).unwrap();
        assert_eq!(force_all(&[e.apply(&p, &q).unwrap()]).unwrap(), vec![eager]);
    }

    #[test]
    fn restores_through_registry() {
        let base: Arc<dyn BilinearGroup> =
            Arc::new(DebugBilinearGroup::new(64, PairingType::Type1, 1).unwrap());
        let bg: Arc<dyn BilinearGroup> = Arc::new(LazyBilinearGroup::new(base));
        let restored = Arc::<dyn BilinearGroup>::from_repr(&bg.to_repr()).unwrap();
        assert!(*restored == *bg);

        let gt = bg.gt();
        let restored_gt = Arc::<dyn Group>::from_repr(&gt.to_repr()).unwrap();
        assert!(*restored_gt == *gt);
        let g = bg.g1().generator().unwrap();
        let value = bg.g1().pow(&g, &BigInt::from(9)).unwrap();
        assert_eq!(bg.g1().restore_element(&value.to_repr()).unwrap(), value);
    }
}
