use common::shapes::{random_direction, random_in_unit_ball, Sphere};
use icosep::{create_index, Config, EntryId, IndexKind, IndexResult, SpatialIndex, Vec3};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::env;
use std::time::{Duration, Instant};

const SEED: u64 = 36207250;
const THINGS: usize = 20_000;
const BULLETS: usize = 64;
const SPAWN_RADIUS: f32 = 40.0;
const THING_RADIUS: f32 = 1.0;
const BULLET_RADIUS: f32 = 0.5;
const THING_SPEED: f32 = 2.0;
const BULLET_SPEED: f32 = 30.0;
const BOUNDS_VELOCITY_LOSS: f32 = 0.99;
const TICK_SECONDS: f32 = 1.0 / 60.0;
const MEASURE_TICKS: usize = 600;

#[derive(Clone, Copy)]
struct Thing {
    body: Sphere,
    velocity: Vec3,
}

impl Thing {
    fn step(&mut self) {
        self.body.update(self.body.center() + self.velocity * TICK_SECONDS);
        let position = self.body.center();
        // Bounce off the spawn sphere, losing a little speed.
        if position.norm() > SPAWN_RADIUS && position.dot(&self.velocity) > 0.0 {
            let normal = position.normalize();
            self.velocity -= normal * (2.0 * self.velocity.dot(&normal));
            self.velocity *= BOUNDS_VELOCITY_LOSS;
        }
    }
}

struct Bullet {
    position: Vec3,
    velocity: Vec3,
    travelled: f32,
}

impl Bullet {
    /// Fired from outside the spawn sphere toward a random point in its inner half.
    fn fire(rng: &mut StdRng) -> Self {
        let origin = random_direction(rng) * SPAWN_RADIUS * 1.5;
        let target = random_in_unit_ball(rng) * SPAWN_RADIUS * 0.5;
        Self {
            position: origin,
            velocity: (target - origin).normalize() * BULLET_SPEED,
            travelled: 0.0,
        }
    }

    fn step(&mut self) {
        self.position += self.velocity * TICK_SECONDS;
        self.travelled += BULLET_SPEED * TICK_SECONDS;
    }

    fn spent(&self) -> bool {
        self.travelled > SPAWN_RADIUS * 3.0
    }
}

struct BenchResult {
    name: &'static str,
    insert_ms: f64,
    update_ms: f64,
    contacts_ms: f64,
    remove_ms: f64,
    tick_total_ms: f64,
    hits: usize,
    remaining: usize,
    notes: String,
}

fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

fn generate_things(seed: u64, count: usize) -> Vec<Thing> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| Thing {
            body: Sphere::random_inside(SPAWN_RADIUS, THING_RADIUS, &mut rng),
            velocity: random_in_unit_ball(&mut rng) * THING_SPEED,
        })
        .collect()
}

fn bench_index(
    kind: IndexKind,
    config: &Config,
    things_seed: &[Thing],
    bullet_count: usize,
    ticks: usize,
) -> IndexResult<BenchResult> {
    let mut index = create_index(kind, config.clone())?;
    let mut rng = StdRng::seed_from_u64(SEED.wrapping_add(1));
    let mut things = things_seed.to_vec();
    let mut ids: Vec<Option<EntryId>> = Vec::with_capacity(things.len());
    let mut owners: HashMap<EntryId, usize> = HashMap::with_capacity(things.len());

    let start = Instant::now();
    for (slot, thing) in things.iter().enumerate() {
        let id = index.insert(thing.body.center(), thing.body.radius())?;
        ids.push(Some(id));
        owners.insert(id, slot);
    }
    if let Some(tree) = index.as_tree() {
        tree.refresh();
    }
    let insert_ms = duration_ms(start.elapsed());

    let mut bullets: Vec<Bullet> = (0..bullet_count).map(|_| Bullet::fire(&mut rng)).collect();
    let mut update_time = Duration::ZERO;
    let mut contacts_time = Duration::ZERO;
    let mut remove_time = Duration::ZERO;
    let mut hit_ids = Vec::new();
    let mut hits = 0;

    for tick in 0..ticks {
        let start = Instant::now();
        for (thing, id) in things.iter_mut().zip(&ids) {
            let Some(id) = *id else {
                continue;
            };
            thing.step();
            index.update(id, thing.body.center())?;
        }
        update_time += start.elapsed();

        let start = Instant::now();
        for bullet in bullets.iter_mut() {
            bullet.step();
            hit_ids.extend(index.contacts(bullet.position, BULLET_RADIUS)?);
        }
        contacts_time += start.elapsed();

        let start = Instant::now();
        for id in hit_ids.drain(..) {
            // Two bullets may touch the same thing in one tick.
            if let Some(slot) = owners.remove(&id) {
                index.remove(id)?;
                ids[slot] = None;
                hits += 1;
            }
        }
        remove_time += start.elapsed();

        for bullet in bullets.iter_mut().filter(|bullet| bullet.spent()) {
            *bullet = Bullet::fire(&mut rng);
        }
        if tick % 100 == 0 {
            debug!("{} tick {}: {} things left", kind.name(), tick, index.len());
        }
    }

    let notes = match index.as_tree() {
        Some(tree) => {
            let stats = tree.take_stats();
            format!(
                "nodes {}, depth {}, splits {}, degenerate {}, unsplits {}, climbs {}",
                tree.node_count(),
                tree.max_depth(),
                stats.splits,
                stats.degenerate_splits,
                stats.unsplits,
                stats.update_climbs
            )
        }
        None => match index.as_grid() {
            Some(grid) => format!("cells {}", grid.cell_count()),
            None => String::new(),
        },
    };

    let per_tick = ticks.max(1) as f64;
    let update_ms = duration_ms(update_time) / per_tick;
    let contacts_ms = duration_ms(contacts_time) / per_tick;
    let remove_ms = duration_ms(remove_time) / per_tick;
    Ok(BenchResult {
        name: kind.name(),
        insert_ms,
        update_ms,
        contacts_ms,
        remove_ms,
        tick_total_ms: update_ms + contacts_ms + remove_ms,
        hits,
        remaining: index.len(),
        notes,
    })
}

fn print_result(result: &BenchResult) {
    println!("{}", result.name);
    println!("  Insert: {:.02}ms", result.insert_ms);
    println!("  Update: {:.02}ms", result.update_ms);
    println!("  Contacts: {:.02}ms", result.contacts_ms);
    println!("  Remove: {:.02}ms", result.remove_ms);
    println!("  Tick total: {:.02}ms", result.tick_total_ms);
    println!("  Hits: {} ({} left)", result.hits, result.remaining);
    if !result.notes.is_empty() {
        println!("  Notes: {}", result.notes);
    }
    println!();
}

fn should_run(filter: Option<&str>, name: &str) -> bool {
    match filter {
        None => true,
        Some(filter) => filter
            .split(',')
            .map(|entry| entry.trim())
            .filter(|entry| !entry.is_empty())
            .any(|entry| name.contains(entry)),
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.parse::<T>().ok())
}

fn main() {
    env_logger::init();

    let ticks = env_parse("ICOSEP_BENCH_TICKS").unwrap_or(MEASURE_TICKS);
    let thing_count = env_parse("ICOSEP_BENCH_THINGS").unwrap_or(THINGS);
    let bullet_count = env_parse("ICOSEP_BENCH_BULLETS").unwrap_or(BULLETS);
    let mut config = Config::default();
    if let Some(split_threshold) = env_parse("ICOSEP_BENCH_SPLIT_THRESHOLD") {
        config = config.with_split_threshold(split_threshold);
    }
    if let Some(cell_size) = env_parse("ICOSEP_BENCH_CELL_SIZE") {
        config = config.with_cell_size(cell_size);
    }
    let filter = env::var("ICOSEP_BENCH_FILTER").ok();

    println!("Simulation settings:");
    println!("Things:           {} (radius {:.01})", thing_count, THING_RADIUS);
    println!("Bullets:          {} (radius {:.01})", bullet_count, BULLET_RADIUS);
    println!("Spawn radius:     {:.01}", SPAWN_RADIUS);
    println!("Split threshold:  {}", config.split_threshold);
    println!("Cell size:        {:.02}", config.cell_size);
    println!("Seed: {}", SEED);
    println!("Measure ticks:    {}", ticks);
    println!();

    let things_seed = generate_things(SEED, thing_count);

    let mut results = Vec::new();
    for kind in IndexKind::ALL {
        if !should_run(filter.as_deref(), kind.name()) {
            continue;
        }
        info!("running {}", kind.name());
        match bench_index(kind, &config, &things_seed, bullet_count, ticks) {
            Ok(result) => results.push(result),
            Err(err) => eprintln!("{} benchmark failed: {err}", kind.name()),
        }
    }

    for result in &results {
        print_result(result);
    }

    // Backends see identical inputs, so exact ones must agree on the hit count.
    let exact: Vec<_> = results
        .iter()
        .filter(|result| result.name != IndexKind::Grid.name())
        .map(|result| result.hits)
        .collect();
    if exact.windows(2).any(|pair| pair[0] != pair[1]) {
        eprintln!("exact backends disagree on hits: {:?}", exact);
    }
}
