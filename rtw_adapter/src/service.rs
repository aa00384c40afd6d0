//! Model service: UDP in, model step, UDP out.
//!
//! The service drains the listener queue in batches of at most
//! `service.batch_size` messages, executes each on the single model
//! instance in arrival order and sends every output to `output.target`.
//! Steps refused because of a model fault are logged and not sent.

use crate::config::AdapterConfig;
use crate::error::ServiceError;
use crate::executor::{Executor, StepOutcome};
use crate::listener::{InputMessage, UdpListener};
use heapless::Vec as BatchVec;
use rtw_common::config::{ConfigError, Validate};
use rtw_common::consts::INPUT_QUEUE_DEPTH;
use rtw_common::model::{ModelBinding, ModelError};
use rtw_common::wire::{TransportMessage, WireMessage};
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Service counters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ServiceStats {
    /// Inputs taken from the queue.
    pub tasks: u64,
    /// Inputs answered from the output cache.
    pub cache_hits: u64,
    /// Inputs refused because of a model fault.
    pub faults: u64,
    /// Output datagrams sent.
    pub sent: u64,
    /// Output datagrams that failed to send.
    pub send_errors: u64,
    /// Longest execution [us].
    pub max_step_us: u64,
    /// Sum of execution times [us].
    pub total_step_us: u64,
}

impl ServiceStats {
    fn record(&mut self, outcome: &StepOutcome) {
        let us = outcome.elapsed.as_micros() as u64;
        if outcome.from_cache {
            self.cache_hits += 1;
        }
        self.total_step_us += us;
        self.max_step_us = self.max_step_us.max(us);
    }

    /// Share of tasks served from the cache [%].
    pub fn cache_ratio(&self) -> f64 {
        if self.tasks == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.tasks as f64 * 100.0
        }
    }

    /// Mean execution time of non-faulted tasks [us].
    pub fn avg_step_us(&self) -> u64 {
        let executed = self.tasks - self.faults;
        if executed == 0 {
            0
        } else {
            self.total_step_us / executed
        }
    }
}

/// UDP-driven model service.
pub struct ModelService<B: ModelBinding> {
    config: AdapterConfig,
    executor: Executor<B>,
    listener: Option<UdpListener>,
    output: Option<UdpSocket>,
    output_addr: SocketAddr,
    running: Arc<AtomicBool>,
    stats: ServiceStats,
    sequence: u32,
}

impl<B: ModelBinding> ModelService<B> {
    /// Create a service from a configuration and an executor.
    ///
    /// # Errors
    /// Returns `ServiceError::Config` if the configuration is invalid.
    pub fn new(config: AdapterConfig, executor: Executor<B>) -> Result<Self, ServiceError> {
        config.validate()?;
        let output_addr = config.output.target.parse::<SocketAddr>().map_err(|e| {
            ConfigError::ValidationError(format!(
                "output.target '{}': {e}",
                config.output.target
            ))
        })?;

        info!(
            "ModelService '{}' created (model '{}', batch {}, cache {})",
            config.shared.service_name,
            config.model.name,
            config.service.batch_size,
            if config.cache.enabled { "on" } else { "off" }
        );

        Ok(Self {
            config,
            executor,
            listener: None,
            output: None,
            output_addr,
            running: Arc::new(AtomicBool::new(false)),
            stats: ServiceStats::default(),
            sequence: 0,
        })
    }

    /// Initialize the model, bind the listener and open the output socket.
    ///
    /// # Errors
    /// Returns the first model or socket error.
    pub fn init(&mut self) -> Result<(), ServiceError> {
        self.executor.initialize()?;

        let listener = UdpListener::bind(
            &self.config.listener.bind,
            self.config.cached_message_lifetime(),
        )?;
        let bind_any = if self.output_addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let output = UdpSocket::bind(bind_any)?;
        info!("Sending outputs to {}", self.output_addr);

        self.listener = Some(listener);
        self.output = Some(output);
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Run the service loop until the running flag drops.
    ///
    /// # Errors
    /// Returns on a non-fault model error.
    pub fn run(&mut self) -> Result<(), ServiceError> {
        if self.listener.is_none() {
            return Err(ServiceError::NotInitialized);
        }

        info!("Starting service loop...");
        while self.running.load(Ordering::SeqCst) {
            self.run_once()?;
        }

        info!(
            "Service loop stopped after {} tasks ({} faults)",
            self.stats.tasks, self.stats.faults
        );
        Ok(())
    }

    /// Execute one batch.
    ///
    /// Waits up to the poll interval for the first message, then takes up
    /// to `batch_size - 1` more without waiting. Returns the number of
    /// messages taken.
    ///
    /// # Errors
    /// Returns `ServiceError::NotInitialized` before `init()`, or a
    /// non-fault execution error.
    pub fn run_once(&mut self) -> Result<usize, ServiceError> {
        let listener = self.listener.as_ref().ok_or(ServiceError::NotInitialized)?;

        let Some(head) = listener.first(self.config.poll_interval()) else {
            return Ok(0);
        };
        let batch_size = self.config.service.batch_size.min(INPUT_QUEUE_DEPTH);

        info!("Input: Num: {} Queue: {}", head.header.num, listener.len());
        info!("{}", head.record);

        let mut batch: BatchVec<InputMessage, INPUT_QUEUE_DEPTH> = BatchVec::new();
        // Capacity is at least one.
        let _ = batch.push(head);
        while batch.len() < batch_size {
            match listener.first(std::time::Duration::ZERO) {
                Some(m) => {
                    let _ = batch.push(m);
                }
                None => break,
            }
        }

        for message in batch.iter() {
            self.process(message)?;
        }

        info!(
            "From cache: {} / {}: {:.2}%",
            self.stats.cache_hits,
            self.stats.tasks,
            self.stats.cache_ratio()
        );
        Ok(batch.len())
    }

    fn process(&mut self, message: &InputMessage) -> Result<(), ServiceError> {
        self.stats.tasks += 1;

        let outcome = match self.executor.execute(&message.record) {
            Ok(outcome) => outcome,
            Err(ServiceError::Model(ModelError::Fault(status))) => {
                self.stats.faults += 1;
                warn!("Input {} not executed, model fault: {}", message.header.num, status);
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        self.stats.record(&outcome);

        info!(
            "Model step: {} Time: {} us",
            if outcome.from_cache { "Cached" } else { "Non-cached" },
            outcome.elapsed.as_micros()
        );
        info!("{}", outcome.output);

        let bytes = if self.config.output.framed {
            TransportMessage::frame(self.sequence, &outcome.output)
        } else {
            outcome.output.encode()
        };
        self.sequence = self.sequence.wrapping_add(1);

        let socket = self.output.as_ref().ok_or(ServiceError::NotInitialized)?;
        match socket.send_to(&bytes, self.output_addr) {
            Ok(_) => {
                self.stats.sent += 1;
                debug!("Output: Size: {}", bytes.len());
            }
            Err(e) => {
                self.stats.send_errors += 1;
                warn!("Failed to send output to {}: {}", self.output_addr, e);
            }
        }
        Ok(())
    }

    /// Stop the listener, terminate the model and flush the cache.
    ///
    /// # Errors
    /// Returns the executor's termination error.
    pub fn shutdown(&mut self) -> Result<(), ServiceError> {
        info!("Shutdown requested");
        self.running.store(false, Ordering::SeqCst);

        if let Some(mut listener) = self.listener.take() {
            listener.shutdown();
            if listener.dropped() > 0 || listener.rejected() > 0 {
                warn!(
                    "Listener dropped {} queued and rejected {} malformed messages",
                    listener.dropped(),
                    listener.rejected()
                );
            }
        }
        self.output = None;

        info!(
            "Tasks: {} cached: {} faults: {} sent: {} avg step: {} us max step: {} us",
            self.stats.tasks,
            self.stats.cache_hits,
            self.stats.faults,
            self.stats.sent,
            self.stats.avg_step_us(),
            self.stats.max_step_us
        );

        if let Err(e) = self.executor.terminate() {
            error!("Failed to terminate model: {}", e);
            return Err(e);
        }
        Ok(())
    }

    /// Running flag for signal handlers.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Service counters.
    pub fn stats(&self) -> ServiceStats {
        self.stats
    }

    /// Bound listener address, once initialized.
    pub fn listener_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().map(UdpListener::local_addr)
    }

    /// The executor.
    pub fn executor(&self) -> &Executor<B> {
        &self.executor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::ModelAdapter;
    use crate::bindings::instance::InstanceBinding;
    use crate::models::EchoModel;
    use std::time::Duration;

    fn echo_service() -> ModelService<InstanceBinding<EchoModel>> {
        let mut config = AdapterConfig::for_model("echo");
        config.listener.bind = "127.0.0.1:0".to_string();
        config.output.target = "127.0.0.1:9".to_string();
        config.service.poll_interval_ms = 10;
        let adapter = ModelAdapter::with_model(InstanceBinding::new(EchoModel::new()));
        ModelService::new(config, Executor::new(adapter, None)).unwrap()
    }

    #[test]
    fn stats_ratio_and_average() {
        let stats = ServiceStats {
            tasks: 4,
            cache_hits: 1,
            faults: 2,
            total_step_us: 30,
            ..ServiceStats::default()
        };
        assert!((stats.cache_ratio() - 25.0).abs() < 1e-9);
        assert_eq!(stats.avg_step_us(), 15);
        assert_eq!(ServiceStats::default().cache_ratio(), 0.0);
        assert_eq!(ServiceStats::default().avg_step_us(), 0);
    }

    #[test]
    fn run_once_requires_init() {
        let mut service = echo_service();
        assert!(matches!(service.run_once(), Err(ServiceError::NotInitialized)));
        assert!(matches!(service.run(), Err(ServiceError::NotInitialized)));
    }

    #[test]
    fn invalid_config_rejected() {
        let mut config = AdapterConfig::for_model("echo");
        config.service.batch_size = 0;
        let adapter = ModelAdapter::with_model(InstanceBinding::new(EchoModel::new()));
        assert!(matches!(
            ModelService::new(config, Executor::new(adapter, None)),
            Err(ServiceError::Config(_))
        ));
    }

    #[test]
    fn idle_poll_returns_zero() {
        let mut service = echo_service();
        service.init().unwrap();
        assert_eq!(service.run_once().unwrap(), 0);
        assert_eq!(service.stats().tasks, 0);
        service.shutdown().unwrap();
    }

    #[test]
    fn running_flag_stops_loop() {
        let mut service = echo_service();
        service.init().unwrap();
        let running = service.running_flag();
        let stopper = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            running.store(false, Ordering::SeqCst);
        });
        service.run().unwrap();
        stopper.join().unwrap();
        service.shutdown().unwrap();
    }
}
