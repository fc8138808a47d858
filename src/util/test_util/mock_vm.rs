//! A mock VM for unit tests.
//!
//! `MockVM` owns a small heap in an arena. Objects in the heap have the following layout, in
//! words: a header, a pointer to a leaked [`MockType`], the number of wide fields, the number
//! of narrow fields, a hidden reference that is reported without a slot (like the mirror of
//! a type), then the wide fields, followed by the 32-bit narrow fields.
//!
//! Object layout and headers are read straight from memory, so the heap walker never needs
//! the mock VM lock while it traces. Roots, threads and monitors live behind the lock.

use std::alloc::Layout;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use enum_map::EnumMap;

use crate::memory_manager;
use crate::staleness::PassStats;
use crate::util::opaque_pointer::*;
use crate::util::{Address, ObjectReference};
use crate::vm::slot::{NarrowSlot, SimpleSlot, Slot, SlotWidth};
use crate::vm::*;
use crate::worker::IncineratorWorker;
use crate::{Incinerator, IncineratorBuilder};

lazy_static! {
    // The mutex may get poisoned any time. Accessing this mutex needs to deal with the poisoned case.
    // One can use read/write_mockvm to access mock vm.
    static ref MOCK_VM_INSTANCE: Mutex<MockVM> = Mutex::new(MockVM::default());
}

// Read without the mock VM lock.
static AT_SAFEPOINT: AtomicBool = AtomicBool::new(false);
static NARROW_BASE: AtomicUsize = AtomicUsize::new(0);

const BYTES_IN_WORD: usize = std::mem::size_of::<usize>();
const OBJECT_ALIGNMENT: usize = 8;

const HEADER_OFFSET: usize = 0;
const TYPE_OFFSET: usize = BYTES_IN_WORD;
const WIDE_COUNT_OFFSET: usize = 2 * BYTES_IN_WORD;
const NARROW_COUNT_OFFSET: usize = 3 * BYTES_IN_WORD;
const HIDDEN_OFFSET: usize = 4 * BYTES_IN_WORD;
const FIELDS_OFFSET: usize = 5 * BYTES_IN_WORD;

/// The size of the mock heap.
pub const MOCK_HEAP_BYTES: usize = 4 << 20;

/// The header of an object that has never been visited, hashed or locked.
pub const DEFAULT_HEADER: usize = 0b01;
/// The header of a visited object.
pub const VISITED_HEADER: usize = 0b11;
const MARK_MASK: usize = 0b11;
/// Identity hash codes are kept above this shift in the header.
pub const HASH_SHIFT: usize = 8;

/// A header carrying the identity hash `hash`.
pub const fn hashed_header(hash: usize) -> usize {
    (hash << HASH_SHIFT) | DEFAULT_HEADER
}

pub type MockLoader = usize;
pub type MockMonitor = usize;

pub fn read_mockvm<F, R>(func: F) -> R
where
    F: FnOnce(&MockVM) -> R,
{
    let lock = MOCK_VM_INSTANCE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    func(&lock)
}

pub fn write_mockvm<F, R>(func: F) -> R
where
    F: FnOnce(&mut MockVM) -> R,
{
    let mut lock = MOCK_VM_INSTANCE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    func(&mut lock)
}

/// Run `test` with a fresh mock VM created by `setup`. Workers started by the test are
/// stopped before `cleanup` runs, whether the test passes or not.
pub fn with_mockvm<S, T, C>(setup: S, test: T, cleanup: C)
where
    S: FnOnce() -> MockVM,
    T: FnOnce() + std::panic::UnwindSafe,
    C: FnOnce(),
{
    super::serial_test(|| {
        // Setup
        {
            write_mockvm(|mock| *mock = setup());
        }
        super::with_cleanup(test, || {
            stop_workers();
            cleanup();
        });
    })
}

pub fn default_setup() -> MockVM {
    MockVM::default()
}

pub fn no_cleanup() {}

/// A VM thread identified by `id`.
pub fn mock_thread(id: usize) -> VMThread {
    VMThread(OpaquePointer::from_address(unsafe {
        Address::from_usize((id + 1) << 4)
    }))
}

/// The thread the worker runs on.
pub fn worker_thread() -> VMThread {
    mock_thread(0xff)
}

/// Create an incinerator for the mock VM with no pass delay, applying `options` on top.
/// It is shut down by [`with_mockvm`] when the test ends.
pub fn mock_incinerator(options: &str) -> &'static Incinerator<MockVM> {
    let mut builder = IncineratorBuilder::new_no_env_vars();
    assert!(memory_manager::process(&mut builder, "pass_delay_ms", "0"));
    assert!(memory_manager::process_bulk(&mut builder, options));
    let incinerator: &'static Incinerator<MockVM> =
        Box::leak(memory_manager::incinerator_init(&builder));
    write_mockvm(|mock| {
        mock.shutdown_hooks
            .push(Box::new(move || memory_manager::shutdown(incinerator)))
    });
    incinerator
}

/// Stop every worker started in the current mock VM, and join their threads. A panic on a worker
/// thread is raised again here.
pub fn stop_workers() {
    let hooks = write_mockvm(|mock| std::mem::take(&mut mock.shutdown_hooks));
    for hook in hooks {
        hook();
    }
    let panicked = join_workers().into_iter().find_map(|result| result.err());
    if let Some(payload) = panicked {
        std::panic::resume_unwind(payload);
    }
}

/// Join the worker threads spawned so far, returning how each of them ended.
pub fn join_workers() -> Vec<std::thread::Result<()>> {
    let threads = write_mockvm(|mock| std::mem::take(&mut mock.worker_threads));
    threads.into_iter().map(|thread| thread.join()).collect()
}

/// Run one pass on the current thread, the way the worker does.
pub fn run_pass(incinerator: &'static Incinerator<MockVM>) -> PassStats {
    let mut worker = IncineratorWorker::new(incinerator);
    worker.run_pass()
}

/// Run `f` as if the world were paused.
pub fn at_safepoint<F: FnOnce() -> R, R>(f: F) -> R {
    AT_SAFEPOINT.store(true, Ordering::SeqCst);
    let result = f();
    AT_SAFEPOINT.store(false, Ordering::SeqCst);
    result
}

/// A gate that a safepoint hook can wait on, so a test can hold the worker inside a pass.
#[derive(Default)]
pub struct Gate {
    open: Mutex<bool>,
    cond: Condvar,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn wait(&self) {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.cond.wait(open).unwrap();
        }
    }

    pub fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.cond.notify_all();
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MockTypeKind {
    Ordinary,
    WeakReference,
    FinalizerRecord,
}

/// The type of a mock object. Types are leaked so that objects can point to them.
#[derive(Debug)]
pub struct MockType {
    pub name: &'static str,
    pub loader: Option<MockLoader>,
    pub has_finalizer: bool,
    pub kind: MockTypeKind,
}

impl MockType {
    pub fn ordinary(name: &'static str, loader: Option<MockLoader>) -> &'static MockType {
        Self::leak(name, loader, false, MockTypeKind::Ordinary)
    }

    pub fn finalizable(name: &'static str, loader: Option<MockLoader>) -> &'static MockType {
        Self::leak(name, loader, true, MockTypeKind::Ordinary)
    }

    /// Weak reference types are defined by the bootstrap loader.
    pub fn weak_reference() -> &'static MockType {
        Self::leak("WeakReference", None, false, MockTypeKind::WeakReference)
    }

    pub fn finalizer_record() -> &'static MockType {
        Self::leak("Finalizer", None, false, MockTypeKind::FinalizerRecord)
    }

    fn leak(
        name: &'static str,
        loader: Option<MockLoader>,
        has_finalizer: bool,
        kind: MockTypeKind,
    ) -> &'static MockType {
        Box::leak(Box::new(MockType {
            name,
            loader,
            has_finalizer,
            kind,
        }))
    }
}

/// If a VM supports multiple kinds of slots, we can use tagged union to represent all of them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MockSlot {
    Wide(SimpleSlot),
    Narrow(NarrowSlot),
}

impl MockSlot {
    /// Store `target` into the slot. The incinerator itself never stores into slots.
    pub fn store(&self, target: Option<ObjectReference>) {
        match self {
            MockSlot::Wide(slot) => {
                let value = target.map_or(0, |t| t.to_raw_address().as_usize());
                word_at(slot.as_address()).store(value, Ordering::SeqCst);
            }
            MockSlot::Narrow(slot) => {
                let value = target.map_or(0, |t| NarrowSlot::encode(narrow_base(), t));
                let cell = unsafe { &*slot.as_address().to_ptr::<AtomicU32>() };
                cell.store(value, Ordering::SeqCst);
            }
        }
    }
}

impl Slot for MockSlot {
    fn load(&self) -> Option<ObjectReference> {
        match self {
            MockSlot::Wide(slot) => slot.load(),
            MockSlot::Narrow(slot) => slot.load(),
        }
    }

    fn clear(&self) {
        match self {
            MockSlot::Wide(slot) => slot.clear(),
            MockSlot::Narrow(slot) => slot.clear(),
        }
    }

    fn width(&self) -> SlotWidth {
        match self {
            MockSlot::Wide(slot) => slot.width(),
            MockSlot::Narrow(slot) => slot.width(),
        }
    }
}

/// A root: a slot, or an object reported without a slot.
#[derive(Copy, Clone, Debug)]
pub enum MockRoot {
    Slot(MockSlot),
    Object(ObjectReference),
}

pub struct MockThread {
    pub tls: VMThread,
    pub thread_object: Option<ObjectReference>,
    /// Hidden threads are not returned by `visible_threads`.
    pub visible: bool,
    pub roots: EnumMap<RootKind, Vec<MockRoot>>,
}

#[derive(Clone, Debug)]
pub struct MockMonitorState {
    pub object: ObjectReference,
    pub owner: Option<VMThread>,
    pub recursions: usize,
    pub waiters: usize,
    pub notify_all_calls: usize,
}

/// The arena of the mock heap. Slots that are not object fields, such as root slots, are
/// allocated here as well, so that narrow roots can be expressed.
pub struct MockHeap {
    start: Address,
    bytes: usize,
    cursor: usize,
    objects: Vec<ObjectReference>,
}

impl MockHeap {
    fn new(bytes: usize) -> Self {
        let start = unsafe { std::alloc::alloc_zeroed(Self::layout(bytes)) };
        assert!(!start.is_null(), "Failed to allocate the mock heap");
        Self {
            start: Address::from_mut_ptr(start),
            bytes,
            // Nothing is ever allocated at the start, which is the narrow base.
            cursor: OBJECT_ALIGNMENT,
            objects: vec![],
        }
    }

    fn layout(bytes: usize) -> Layout {
        Layout::from_size_align(bytes, OBJECT_ALIGNMENT).unwrap()
    }

    fn alloc(&mut self, bytes: usize) -> Address {
        let start = (self.start + self.cursor).align_up(OBJECT_ALIGNMENT);
        let end = start + bytes;
        assert!(end <= self.start + self.bytes, "The mock heap is exhausted");
        self.cursor = end - self.start;
        start
    }

    pub fn start(&self) -> Address {
        self.start
    }

    /// All the objects allocated so far, in allocation order.
    pub fn objects(&self) -> &[ObjectReference] {
        &self.objects
    }
}

impl Drop for MockHeap {
    fn drop(&mut self) {
        unsafe { std::alloc::dealloc(self.start.to_mut_ptr(), Self::layout(self.bytes)) }
    }
}

pub struct MockVM {
    pub heap: MockHeap,
    pub roots: EnumMap<RootKind, Vec<MockRoot>>,
    pub threads: Vec<MockThread>,
    pub monitors: Vec<MockMonitorState>,
    monitor_table: HashMap<ObjectReference, MockMonitor>,
    /// The result of `prepare_worker_thread`.
    pub prepare_worker_thread: bool,
    /// Called by `execute_at_safepoint` after the operation's prologue, without the mock VM
    /// lock held.
    pub safepoint_hook: Option<Arc<dyn Fn() + Send + Sync>>,
    pub safepoints: usize,
    pub deflations: usize,
    worker_threads: Vec<JoinHandle<()>>,
    shutdown_hooks: Vec<Box<dyn FnOnce() + Send>>,
}

impl Default for MockVM {
    fn default() -> Self {
        let heap = MockHeap::new(MOCK_HEAP_BYTES);
        NARROW_BASE.store(heap.start().as_usize(), Ordering::SeqCst);
        Self {
            heap,
            roots: EnumMap::default(),
            threads: vec![],
            monitors: vec![],
            monitor_table: HashMap::new(),
            prepare_worker_thread: true,
            safepoint_hook: None,
            safepoints: 0,
            deflations: 0,
            worker_threads: vec![],
            shutdown_hooks: vec![],
        }
    }
}

unsafe impl Sync for MockVM {}
unsafe impl Send for MockVM {}

impl MockVM {
    /// Allocate an object of type `ty` with `wide` wide fields and `narrow` narrow fields,
    /// all empty.
    pub fn alloc(&mut self, ty: &'static MockType, wide: usize, narrow: usize) -> ObjectReference {
        let bytes = FIELDS_OFFSET + wide * BYTES_IN_WORD + narrow * std::mem::size_of::<u32>();
        let start = self.heap.alloc(bytes);
        let object = ObjectReference::from_raw_address(start).unwrap();
        store_word(object, HEADER_OFFSET, DEFAULT_HEADER);
        store_word(object, TYPE_OFFSET, ty as *const MockType as usize);
        store_word(object, WIDE_COUNT_OFFSET, wide);
        store_word(object, NARROW_COUNT_OFFSET, narrow);
        self.heap.objects.push(object);
        object
    }

    fn alloc_cell(&mut self, width: SlotWidth) -> MockSlot {
        match width {
            SlotWidth::Wide => MockSlot::Wide(SimpleSlot::from_address(
                self.heap.alloc(BYTES_IN_WORD),
            )),
            SlotWidth::Narrow => MockSlot::Narrow(NarrowSlot::from_address(
                self.heap.alloc(std::mem::size_of::<u32>()),
                self.heap.start(),
            )),
        }
    }

    /// Add a global root slot of the given width holding `target`.
    pub fn add_root(
        &mut self,
        kind: RootKind,
        width: SlotWidth,
        target: Option<ObjectReference>,
    ) -> MockSlot {
        assert!(!kind.is_per_thread(), "{} is a per-thread root kind", kind);
        let slot = self.alloc_cell(width);
        slot.store(target);
        self.roots[kind].push(MockRoot::Slot(slot));
        slot
    }

    /// Add a global root that reports `object` without a slot.
    pub fn add_root_object(&mut self, kind: RootKind, object: ObjectReference) {
        assert!(!kind.is_per_thread(), "{} is a per-thread root kind", kind);
        self.roots[kind].push(MockRoot::Object(object));
    }

    /// Add a visible thread.
    pub fn add_thread(&mut self, thread_object: Option<ObjectReference>) -> VMThread {
        let tls = mock_thread(self.threads.len());
        self.threads.push(MockThread {
            tls,
            thread_object,
            visible: true,
            roots: EnumMap::default(),
        });
        tls
    }

    fn thread_mut(&mut self, tls: VMThread) -> &mut MockThread {
        self.threads
            .iter_mut()
            .find(|t| t.tls == tls)
            .unwrap_or_else(|| panic!("Unknown mock thread {:?}", tls))
    }

    pub fn hide_thread(&mut self, tls: VMThread) {
        self.thread_mut(tls).visible = false;
    }

    /// Add a wide root slot of `thread` holding `target`.
    pub fn add_thread_root(
        &mut self,
        tls: VMThread,
        kind: RootKind,
        target: Option<ObjectReference>,
    ) -> MockSlot {
        assert!(kind.is_per_thread(), "{} is not a per-thread root kind", kind);
        let slot = self.alloc_cell(SlotWidth::Wide);
        slot.store(target);
        self.thread_mut(tls).roots[kind].push(MockRoot::Slot(slot));
        slot
    }

    /// The number of worker threads spawned and not yet joined.
    pub fn spawned_workers(&self) -> usize {
        self.worker_threads.len()
    }

    /// Inflate the monitor of `object`.
    pub fn inflate_monitor(
        &mut self,
        object: ObjectReference,
        owner: Option<VMThread>,
        recursions: usize,
        waiters: usize,
    ) -> MockMonitor {
        let monitor = self.monitors.len();
        self.monitors.push(MockMonitorState {
            object,
            owner,
            recursions,
            waiters,
            notify_all_calls: 0,
        });
        self.monitor_table.insert(object, monitor);
        monitor
    }
}

fn narrow_base() -> Address {
    unsafe { Address::from_usize(NARROW_BASE.load(Ordering::SeqCst)) }
}

fn word_at(addr: Address) -> &'static AtomicUsize {
    unsafe { &*addr.to_ptr::<AtomicUsize>() }
}

fn load_word(object: ObjectReference, offset: usize) -> usize {
    word_at(object.to_raw_address() + offset).load(Ordering::SeqCst)
}

fn store_word(object: ObjectReference, offset: usize, value: usize) {
    word_at(object.to_raw_address() + offset).store(value, Ordering::SeqCst)
}

pub fn type_of(object: ObjectReference) -> &'static MockType {
    unsafe { &*(load_word(object, TYPE_OFFSET) as *const MockType) }
}

pub fn wide_field(object: ObjectReference, index: usize) -> MockSlot {
    let count = load_word(object, WIDE_COUNT_OFFSET);
    assert!(index < count, "{} has {} wide fields", object, count);
    MockSlot::Wide(SimpleSlot::from_address(
        object.to_raw_address() + FIELDS_OFFSET + index * BYTES_IN_WORD,
    ))
}

pub fn narrow_field(object: ObjectReference, index: usize) -> MockSlot {
    let wide = load_word(object, WIDE_COUNT_OFFSET);
    let count = load_word(object, NARROW_COUNT_OFFSET);
    assert!(index < count, "{} has {} narrow fields", object, count);
    let addr = object.to_raw_address()
        + FIELDS_OFFSET
        + wide * BYTES_IN_WORD
        + index * std::mem::size_of::<u32>();
    MockSlot::Narrow(NarrowSlot::from_address(addr, narrow_base()))
}

/// Store `from.wide[index] = to`.
pub fn link(from: ObjectReference, index: usize, to: ObjectReference) {
    wide_field(from, index).store(Some(to));
}

/// Set the reference that scanning `object` reports without a slot.
pub fn set_hidden(object: ObjectReference, hidden: Option<ObjectReference>) {
    store_word(
        object,
        HIDDEN_OFFSET,
        hidden.map_or(0, |h| h.to_raw_address().as_usize()),
    );
}

pub fn header_of(object: ObjectReference) -> usize {
    load_word(object, HEADER_OFFSET)
}

pub fn set_header(object: ObjectReference, header: usize) {
    store_word(object, HEADER_OFFSET, header)
}

impl VMBinding for MockVM {
    type VMObjectModel = MockVM;
    type VMScanning = MockVM;
    type VMCollection = MockVM;
    type VMSynchronization = MockVM;

    type VMSlot = MockSlot;
    type VMLoader = MockLoader;
    type VMMonitor = MockMonitor;
}

impl crate::vm::ObjectModel<MockVM> for MockVM {
    fn loader_of(object: ObjectReference) -> Option<MockLoader> {
        type_of(object).loader
    }

    fn has_finalizer(object: ObjectReference) -> bool {
        type_of(object).has_finalizer
    }

    fn is_weak_reference(object: ObjectReference) -> bool {
        type_of(object).kind == MockTypeKind::WeakReference
    }

    fn is_finalizer_record(object: ObjectReference) -> bool {
        type_of(object).kind == MockTypeKind::FinalizerRecord
    }

    fn load_header(object: ObjectReference) -> usize {
        header_of(object)
    }

    fn store_header(object: ObjectReference, header: usize) {
        set_header(object, header)
    }

    fn is_marked_header(header: usize) -> bool {
        header & MARK_MASK == MARK_MASK
    }

    fn visited_header() -> usize {
        VISITED_HEADER
    }

    fn default_header(_object: ObjectReference) -> usize {
        DEFAULT_HEADER
    }

    fn header_must_be_preserved(_object: ObjectReference, header: usize) -> bool {
        header != DEFAULT_HEADER
    }
}

fn visit_roots<SV: SlotVisitor<MockSlot>>(roots: Vec<MockRoot>, slot_visitor: &mut SV) {
    for root in roots {
        match root {
            MockRoot::Slot(slot) => slot_visitor.visit_slot(slot),
            MockRoot::Object(object) => slot_visitor.visit_object(object),
        }
    }
}

impl crate::vm::Scanning<MockVM> for MockVM {
    fn scan_object<SV: SlotVisitor<MockSlot>>(
        _tls: VMWorkerThread,
        object: ObjectReference,
        slot_visitor: &mut SV,
    ) {
        let hidden = unsafe { Address::from_usize(load_word(object, HIDDEN_OFFSET)) };
        if let Some(hidden) = ObjectReference::from_raw_address(hidden) {
            slot_visitor.visit_object(hidden);
        }
        for i in 0..load_word(object, WIDE_COUNT_OFFSET) {
            slot_visitor.visit_slot(wide_field(object, i));
        }
        for i in 0..load_word(object, NARROW_COUNT_OFFSET) {
            slot_visitor.visit_slot(narrow_field(object, i));
        }
    }

    fn scan_roots<SV: SlotVisitor<MockSlot>>(
        _tls: VMWorkerThread,
        kind: RootKind,
        slot_visitor: &mut SV,
    ) {
        assert!(!kind.is_per_thread());
        let roots = read_mockvm(|mock| mock.roots[kind].clone());
        visit_roots(roots, slot_visitor);
    }

    fn visible_threads() -> Vec<VisibleThread> {
        read_mockvm(|mock| {
            mock.threads
                .iter()
                .filter(|t| t.visible)
                .map(|t| VisibleThread {
                    tls: t.tls,
                    thread_object: t.thread_object,
                })
                .collect()
        })
    }

    fn scan_thread_roots<SV: SlotVisitor<MockSlot>>(
        _tls: VMWorkerThread,
        thread: VMThread,
        kind: RootKind,
        slot_visitor: &mut SV,
    ) {
        assert!(kind.is_per_thread());
        let roots = read_mockvm(|mock| {
            mock.threads
                .iter()
                .find(|t| t.tls == thread)
                .map(|t| t.roots[kind].clone())
                .unwrap_or_default()
        });
        visit_roots(roots, slot_visitor);
    }

    fn enumerate_objects<F: FnMut(ObjectReference)>(_tls: VMWorkerThread, mut visitor: F) {
        let objects = read_mockvm(|mock| mock.heap.objects().to_vec());
        for object in objects {
            visitor(object);
        }
    }
}

impl crate::vm::Collection<MockVM> for MockVM {
    fn execute_at_safepoint(tls: VMWorkerThread, op: &mut dyn SafepointOperation) {
        if !op.prologue(tls) {
            return;
        }
        let hook = read_mockvm(|mock| mock.safepoint_hook.clone());
        if let Some(hook) = hook {
            hook();
        }
        at_safepoint(|| op.run(tls));
        write_mockvm(|mock| mock.safepoints += 1);
        op.epilogue(tls);
    }

    fn is_at_safepoint() -> bool {
        AT_SAFEPOINT.load(Ordering::SeqCst)
    }

    fn spawn_worker_thread(_tls: VMThread, worker: Box<IncineratorWorker<MockVM>>) {
        let handle = std::thread::Builder::new()
            .name("incinerator".to_string())
            .spawn(move || {
                let mut worker = worker;
                let incinerator = worker.incinerator();
                let tls = VMWorkerThread(worker_thread());
                memory_manager::start_worker(incinerator, tls, &mut worker);
            })
            .unwrap();
        write_mockvm(|mock| mock.worker_threads.push(handle));
    }

    fn prepare_worker_thread(_tls: VMWorkerThread) -> bool {
        read_mockvm(|mock| mock.prepare_worker_thread)
    }
}

impl crate::vm::Synchronization<MockVM> for MockVM {
    fn monitor_of(object: ObjectReference) -> Option<MockMonitor> {
        read_mockvm(|mock| mock.monitor_table.get(&object).copied())
    }

    fn monitor_owner(monitor: MockMonitor) -> Option<VMThread> {
        read_mockvm(|mock| mock.monitors[monitor].owner)
    }

    fn notify_all(monitor: MockMonitor, owner: VMThread) {
        write_mockvm(|mock| {
            let state = &mut mock.monitors[monitor];
            assert_eq!(state.owner, Some(owner));
            state.waiters = 0;
            state.notify_all_calls += 1;
        })
    }

    fn complete_exit(monitor: MockMonitor, owner: VMThread) -> usize {
        write_mockvm(|mock| {
            let state = &mut mock.monitors[monitor];
            assert_eq!(state.owner, Some(owner));
            state.owner = None;
            std::mem::take(&mut state.recursions)
        })
    }

    fn deflate_idle_monitors(_tls: VMWorkerThread) {
        write_mockvm(|mock| mock.deflations += 1)
    }
}
