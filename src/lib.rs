mod configuration;
mod emitter;
mod event;
mod name;
mod packet;
mod sampler;
mod transport;

pub use self::{
    configuration::Configuration,
    emitter::Emitter,
    event::RequestOutcome,
    name::{classify, MetricName, ResourceType},
    packet::encode,
    sampler::{SampleMode, Sampler},
    transport::{Transport, UdpTransport},
};
